use std::collections::BTreeSet;

use log::{debug, trace};

use crate::{
    codegen::{
        lifetime_analysis::{LiveSet, NextUse},
        machine::{MachineInstr, MachineListing, MachineOperand, Register},
        straight_line::Operand,
    },
    config::RegisterCapacity,
    error::BackendError,
    listing::Position,
};

use super::register_file::RegisterFile;

/// Assigns variables to registers on demand, spilling the resident variable
/// whose next use lies furthest ahead when the register file is full.
/// Loads and stores needed to keep memory consistent are written to the
/// listing handed to each call.
#[derive(Debug)]
pub struct RegisterAllocator {
    registers: RegisterFile,
    /// Resident variables written since they were brought into a register.
    modified: BTreeSet<String>,
}
impl RegisterAllocator {
    pub fn new(capacity: RegisterCapacity) -> Self {
        Self {
            registers: RegisterFile::new(capacity),
            modified: BTreeSet::new(),
        }
    }

    /// Find a home for `operand`. Immediates need none. `live` and
    /// `next_use` describe the program point being resolved at; `pinned`
    /// names a register that already holds an operand of the current
    /// instruction and must survive.
    pub fn resolve(
        &mut self,
        operand: &Operand,
        live: &LiveSet,
        next_use: &NextUse,
        load_if_absent: bool,
        pinned: Option<Register>,
        code: &mut MachineListing,
    ) -> Result<MachineOperand, BackendError> {
        match operand {
            Operand::Imm(value) => Ok(MachineOperand::Imm(*value)),
            Operand::Var(var) => self
                .resolve_variable(var, live, next_use, load_if_absent, pinned, code)
                .map(MachineOperand::Reg),
        }
    }

    pub fn resolve_variable(
        &mut self,
        var: &str,
        live: &LiveSet,
        next_use: &NextUse,
        load_if_absent: bool,
        pinned: Option<Register>,
        code: &mut MachineListing,
    ) -> Result<Register, BackendError> {
        if let Some(register) = self.registers.slot_of(var) {
            trace!("{} already resident in {}", var, register);
            return Ok(register);
        }

        let register = match self.registers.free_slot() {
            Some(register) => register,
            None => self
                .choose_victim(next_use, pinned)
                .ok_or_else(|| BackendError::NoEvictionCandidate(var.to_string()))?,
        };

        if let Some(victim) = self.registers.bind(register, var) {
            debug!("Evicting {} from {} in favour of {}", victim, register, var);
            // Removal happens whether or not the store is needed.
            if self.modified.remove(&victim) && live.contains(&victim) {
                debug!("Storing {} before reusing {}", victim, register);
                code.push(MachineInstr::St(victim, register));
            }
        }

        if load_if_absent {
            trace!("Loading {} into {}", var, register);
            code.push(MachineInstr::Ld(register, var.to_string()));
        }

        Ok(register)
    }

    /// Pick the register to spill: the first resident variable that is never
    /// used again or, failing that, the one whose nearest use is furthest
    /// away. Ties go to the lowest register.
    fn choose_victim(&self, next_use: &NextUse, pinned: Option<Register>) -> Option<Register> {
        let mut furthest: Option<(Position, Register)> = None;

        for (register, var) in self.registers.resident() {
            if Some(register) == pinned {
                continue;
            }
            match next_use.next_use(var) {
                None => return Some(register),
                Some(position) => {
                    if furthest.map_or(true, |(best, _)| position > best) {
                        furthest = Some((position, register));
                    }
                }
            }
        }

        furthest.map(|(_, register)| register)
    }

    pub fn mark_modified<S: Into<String>>(&mut self, var: S) {
        self.modified.insert(var.into());
    }

    pub fn is_modified(&self, var: &str) -> bool {
        self.modified.contains(var)
    }

    /// Store every resident, modified variable listed in `returns`, in
    /// register order.
    pub fn final_stores(&self, returns: &[String], code: &mut MachineListing) {
        for (register, var) in self.registers.resident() {
            if self.modified.contains(var) && returns.iter().any(|r| r == var) {
                code.push(MachineInstr::St(var.to_string(), register));
            }
        }
    }

    pub fn resident_count(&self) -> usize {
        self.registers.resident().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! make_allocator {
        ($capacity:expr) => {
            RegisterAllocator::new(RegisterCapacity::new($capacity).unwrap())
        };
    }

    macro_rules! resolve {
        ($allocator:expr, $code:expr, $var:literal, live: [$($live:literal),*], uses: [$($use_var:literal @ $at:expr),*]) => {
            resolve!($allocator, $code, $var, live: [$($live),*], uses: [$($use_var @ $at),*], pinned: None)
        };
        ($allocator:expr, $code:expr, $var:literal, live: [$($live:literal),*], uses: [$($use_var:literal @ $at:expr),*], pinned: $pinned:expr) => {{
            let live: LiveSet = [$($live.to_string()),*].into_iter().collect();
            #[allow(unused_mut)]
            let mut next_use = NextUse::default();
            $(next_use.record($use_var, Position($at));)*
            $allocator.resolve_variable($var, &live, &next_use, true, $pinned, &mut $code)
        }};
    }

    fn text(code: &MachineListing) -> Vec<String> {
        code.iter_instructions().map(ToString::to_string).collect()
    }

    #[test]
    fn immediates_are_returned_verbatim() {
        let mut allocator = make_allocator!(1);
        let mut code = MachineListing::new();

        let operand = allocator
            .resolve(
                &Operand::Imm(7),
                &LiveSet::new(),
                &NextUse::default(),
                true,
                None,
                &mut code,
            )
            .unwrap();

        assert_eq!(MachineOperand::Imm(7), operand);
        assert!(code.is_empty());
        assert_eq!(0, allocator.resident_count());
    }

    #[test]
    fn free_registers_are_filled_in_order() {
        let mut allocator = make_allocator!(3);
        let mut code = MachineListing::new();

        let a = resolve!(allocator, code, "a", live: [], uses: []).unwrap();
        let b = resolve!(allocator, code, "b", live: [], uses: []).unwrap();
        let again = resolve!(allocator, code, "a", live: [], uses: []).unwrap();

        assert_eq!(Register(0), a);
        assert_eq!(Register(1), b);
        assert_eq!(a, again);
        assert_eq!(vec!["LD R0, a", "LD R1, b"], text(&code));
    }

    #[test]
    fn target_resolution_does_not_load() {
        let mut allocator = make_allocator!(2);
        let mut code = MachineListing::new();

        allocator
            .resolve_variable("t", &LiveSet::new(), &NextUse::default(), false, None, &mut code)
            .unwrap();

        assert!(code.is_empty());
    }

    #[test]
    fn evicts_variable_without_next_use_first() {
        let mut allocator = make_allocator!(2);
        let mut code = MachineListing::new();
        resolve!(allocator, code, "a", live: [], uses: []).unwrap();
        resolve!(allocator, code, "b", live: [], uses: []).unwrap();

        let c = resolve!(allocator, code, "c", live: ["a"], uses: ["a" @ 4]).unwrap();

        assert_eq!(Register(1), c);
    }

    #[test]
    fn evicts_furthest_next_use() {
        let mut allocator = make_allocator!(3);
        let mut code = MachineListing::new();
        resolve!(allocator, code, "a", live: [], uses: []).unwrap();
        resolve!(allocator, code, "b", live: [], uses: []).unwrap();
        resolve!(allocator, code, "c", live: [], uses: []).unwrap();

        let d = resolve!(allocator, code, "d", live: ["a", "b", "c"],
            uses: ["a" @ 2, "b" @ 9, "b" @ 1, "c" @ 5]).unwrap();

        // b's nearest use is 1, so c (5) is furthest.
        assert_eq!(Register(2), d);
    }

    #[test]
    fn eviction_ties_go_to_lowest_register() {
        let mut allocator = make_allocator!(2);
        let mut code = MachineListing::new();
        resolve!(allocator, code, "a", live: [], uses: []).unwrap();
        resolve!(allocator, code, "b", live: [], uses: []).unwrap();

        let c = resolve!(allocator, code, "c", live: ["a", "b"], uses: ["a" @ 3, "b" @ 3]).unwrap();

        assert_eq!(Register(0), c);
    }

    #[test]
    fn modified_live_victim_is_stored() {
        let mut allocator = make_allocator!(1);
        let mut code = MachineListing::new();
        allocator
            .resolve_variable("a", &LiveSet::new(), &NextUse::default(), false, None, &mut code)
            .unwrap();
        allocator.mark_modified("a");

        resolve!(allocator, code, "b", live: ["a"], uses: ["a" @ 6]).unwrap();

        assert_eq!(vec!["ST a, R0", "LD R0, b"], text(&code));
        assert!(!allocator.is_modified("a"));
    }

    #[test]
    fn modified_dead_victim_is_dropped() {
        let mut allocator = make_allocator!(1);
        let mut code = MachineListing::new();
        resolve!(allocator, code, "a", live: [], uses: []).unwrap();
        allocator.mark_modified("a");

        resolve!(allocator, code, "b", live: [], uses: []).unwrap();

        assert_eq!(vec!["LD R0, a", "LD R0, b"], text(&code));
        assert!(!allocator.is_modified("a"));
    }

    #[test]
    fn pinned_register_is_never_evicted() {
        let mut allocator = make_allocator!(2);
        let mut code = MachineListing::new();
        resolve!(allocator, code, "a", live: [], uses: []).unwrap();
        resolve!(allocator, code, "b", live: [], uses: []).unwrap();

        let c = resolve!(allocator, code, "c", live: [], uses: ["b" @ 1], pinned: Some(Register(0)))
            .unwrap();

        assert_eq!(Register(1), c);
    }

    #[test]
    fn fails_when_everything_is_pinned() {
        let mut allocator = make_allocator!(1);
        let mut code = MachineListing::new();
        resolve!(allocator, code, "a", live: [], uses: []).unwrap();

        let result = resolve!(allocator, code, "b", live: [], uses: [], pinned: Some(Register(0)));

        assert_eq!(Err(BackendError::NoEvictionCandidate("b".into())), result);
    }

    #[test]
    fn final_stores_cover_modified_returns_in_register_order() {
        let mut allocator = make_allocator!(3);
        let mut code = MachineListing::new();
        for var in ["x", "y", "z"] {
            allocator
                .resolve_variable(var, &LiveSet::new(), &NextUse::default(), false, None, &mut code)
                .unwrap();
        }
        allocator.mark_modified("z");
        allocator.mark_modified("x");
        allocator.mark_modified("y");

        let mut stores = MachineListing::new();
        allocator.final_stores(&["z".to_string(), "x".to_string()], &mut stores);

        assert_eq!(vec!["ST x, R0", "ST z, R2"], text(&stores));
    }
}
