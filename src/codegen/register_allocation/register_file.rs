use crate::{codegen::machine::Register, config::RegisterCapacity};

/// A fixed number of register slots, each holding at most one variable.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    slots: Vec<Option<String>>,
}
impl RegisterFile {
    pub fn new(capacity: RegisterCapacity) -> Self {
        Self {
            slots: vec![None; capacity.get()],
        }
    }

    /// The register currently holding `var`, if any.
    pub fn slot_of(&self, var: &str) -> Option<Register> {
        self.slots
            .iter()
            .position(|slot| slot.as_deref() == Some(var))
            .map(Register)
    }

    /// The lowest empty register.
    pub fn free_slot(&self) -> Option<Register> {
        self.slots.iter().position(Option::is_none).map(Register)
    }

    /// Place `var` in `register`, returning the variable it displaces.
    pub fn bind<S: Into<String>>(&mut self, register: Register, var: S) -> Option<String> {
        self.slots[register.0].replace(var.into())
    }

    /// Occupied registers in slot order.
    pub fn resident(&self) -> impl Iterator<Item = (Register, &str)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_deref().map(|var| (Register(index), var)))
    }
}
