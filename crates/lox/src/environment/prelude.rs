//! Native functions available in every global scope

use std::time::{SystemTime, UNIX_EPOCH};

use super::Environment;
use crate::value::{NativeFunction, Value};

impl Environment {
    /// Create a global scope with the native functions defined.
    pub fn with_prelude() -> Self {
        let mut env = Self::new();
        env.load_prelude();
        env
    }

    /// Define the native functions in this scope.
    pub fn load_prelude(&mut self) {
        self.define_native(NativeFunction::new("clock", 0, native_clock));
    }

    /// Bind a native function under its own name.
    pub fn define_native(&mut self, native: NativeFunction) {
        self.define(native.name.clone(), Value::Native(native));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Native Function Implementations
// ═══════════════════════════════════════════════════════════════════════

/// Seconds since the Unix epoch, as a float.
fn native_clock(_args: &[Value]) -> Result<Value, String> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| Value::Number(elapsed.as_secs_f64()))
        .map_err(|e| format!("Clock error: {}", e))
}
