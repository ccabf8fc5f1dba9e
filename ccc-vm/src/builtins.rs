use ccc_ir::Constant;
use num_traits::ToPrimitive;
use std::collections::HashMap;

/// A native function. Anything it prints is appended to `out`.
pub type NativeFn = fn(args: &[Constant], out: &mut String) -> Option<Constant>;

/// Native functions, looked up by name when a program calls a function it only declared.
#[derive(Clone, Default)]
pub struct Builtins {
    functions: HashMap<String, (NativeFn, usize)>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_native_fn(&mut self, name: &str, func: NativeFn, arity: usize) {
        self.functions.insert(name.to_string(), (func, arity));
    }

    /// Returns the function and its arity.
    pub fn get(&self, name: &str) -> Option<(NativeFn, usize)> {
        self.functions.get(name).copied()
    }
}

/// Returns the default [`Builtins`] that should be used.
pub fn default_builtins() -> Builtins {
    let mut builtins = Builtins::new();
    builtins.add_native_fn("putint", putint, 1);
    builtins.add_native_fn("put_int", putint, 1);
    builtins.add_native_fn("putascii", putascii, 1);
    builtins
}

fn int_arg(args: &[Constant]) -> Option<i64> {
    match *args.first()? {
        Constant::I1(val) => Some(i64::from(val)),
        Constant::I8(val) => Some(i64::from(val)),
        Constant::I16(val) => Some(i64::from(val)),
        Constant::I32(val) => Some(i64::from(val)),
        Constant::I64(val) => Some(val),
        Constant::F32(val) => val.to_i64(),
        Constant::F64(val) => val.to_i64(),
    }
}

pub fn putint(args: &[Constant], out: &mut String) -> Option<Constant> {
    if let Some(val) = int_arg(args) {
        out.push_str(&format!("putint: {}\n", val));
    }
    None
}

/// Prints the low byte of its argument as a character.
pub fn putascii(args: &[Constant], out: &mut String) -> Option<Constant> {
    if let Some(val) = int_arg(args) {
        out.push(char::from(val as u8));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format() {
        let builtins = default_builtins();
        let mut out = String::new();
        for name in ["putint", "put_int"] {
            let (func, arity) = builtins.get(name).unwrap();
            assert_eq!(arity, 1);
            assert_eq!(func(&[Constant::I32(-12)], &mut out), None);
        }
        let (putascii, _) = builtins.get("putascii").unwrap();
        putascii(&[Constant::I32(0x41)], &mut out);
        assert_eq!(out, "putint: -12\nputint: -12\nA");
        assert!(builtins.get("printf").is_none());
    }
}
