//! Named parameter store
//!
//! A fixed-capacity map from parameter name to value with per-parameter
//! flags. Persistence (flash, ground station) is handled outside the core.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::{FnvIndexMap, String};

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters (power of two for the index map)
pub const MAX_PARAMS: usize = 128;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ParamFlags: u8 {
        /// Not listed by `iter_names`
        const HIDDEN = 0b00000001;
        /// Rejects `set`
        const READ_ONLY = 0b00000010;
    }
}

/// Parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl ParamValue {
    /// Numeric view of the value, booleans map to 0/1
    pub fn as_f32(&self) -> f32 {
        match *self {
            ParamValue::Bool(v) => f32::from(u8::from(v)),
            ParamValue::Int(v) => v as f32,
            ParamValue::Float(v) => v,
        }
    }

    /// Integer view of the value, floats are truncated
    pub fn as_i32(&self) -> i32 {
        match *self {
            ParamValue::Bool(v) => i32::from(v),
            ParamValue::Int(v) => v,
            ParamValue::Float(v) => v as i32,
        }
    }

    pub fn as_bool(&self) -> bool {
        match *self {
            ParamValue::Bool(v) => v,
            ParamValue::Int(v) => v != 0,
            ParamValue::Float(v) => v != 0.0,
        }
    }
}

/// Parameter store for configuration management
pub struct ParameterStore {
    parameters: FnvIndexMap<String<PARAM_NAME_LEN>, (ParamValue, ParamFlags), MAX_PARAMS>,
    /// Changed since the last save
    dirty: bool,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::new();
    key.push_str(name)
        .map_err(|_| ParameterError::InvalidConfig)?;
    Ok(key)
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            parameters: FnvIndexMap::new(),
            dirty: false,
        }
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let key = key(name).ok()?;
        self.parameters.get(&key).map(|(value, _)| *value)
    }

    /// Set an existing parameter and mark the store dirty.
    ///
    /// The value must keep the registered type.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = key(name)?;
        let (slot, flags) = self
            .parameters
            .get_mut(&key)
            .ok_or(ParameterError::InvalidConfig)?;

        if flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        if core::mem::discriminant(slot) != core::mem::discriminant(&value) {
            return Err(ParameterError::TypeMismatch);
        }

        *slot = value;
        self.dirty = true;
        Ok(())
    }

    /// Register a parameter with its default value.
    ///
    /// Registering an existing name keeps the stored value.
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = key(name)?;
        if self.parameters.contains_key(&key) {
            return Ok(());
        }

        self.parameters
            .insert(key, (default_value, flags))
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        key(name)
            .ok()
            .and_then(|key| self.parameters.get(&key))
            .is_some_and(|(_, flags)| flags.contains(ParamFlags::HIDDEN))
    }

    /// Names of all visible parameters
    pub fn iter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|(_, (_, flags))| !flags.contains(ParamFlags::HIDDEN))
            .map(|(name, _)| name.as_str())
    }

    /// Number of visible parameters
    pub fn count(&self) -> usize {
        self.iter_names().count()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
