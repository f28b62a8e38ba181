//! Liveness and next-use analysis of straight-line programs.
//!
//! Both analyses are a single backward sweep. With no branches in the
//! program, the state after each instruction is simply the state before the
//! one that follows it, so no fixed-point iteration is needed.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display, Formatter},
};

use itertools::Itertools;
use log::trace;

use crate::listing::Position;

use super::straight_line::{Quad, StraightLine};

pub type LiveSet = BTreeSet<String>;

/// For every variable, the ascending positions at which it will be read.
/// A variable without an entry has no future use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextUse(BTreeMap<String, Vec<Position>>);
impl NextUse {
    pub fn get(&self, var: &str) -> Option<&[Position]> {
        self.0.get(var).map(Vec::as_slice)
    }

    /// The closest upcoming use of `var`.
    pub fn next_use(&self, var: &str) -> Option<Position> {
        self.get(var).and_then(|uses| uses.first().copied())
    }

    /// Record a use of `var` at `position`. Repeated uses accumulate.
    pub fn record(&mut self, var: &str, position: Position) {
        let uses = self.0.entry(var.to_string()).or_default();
        if let Err(index) = uses.binary_search(&position) {
            uses.insert(index, position);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Position>)> {
        self.0.iter()
    }
}
impl Display for NextUse {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let entries = self
            .0
            .iter()
            .map(|(var, uses)| format!("{}:[{}]", var, uses.iter().join(", ")));
        write!(f, "{}", entries.format(", "))
    }
}

/// Dataflow facts on entry to and exit from one instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineAnalysis {
    pub life_in: LiveSet,
    pub life_out: LiveSet,
    pub next_in: NextUse,
    pub next_out: NextUse,
}
impl LineAnalysis {
    /// Lines for the diagnostic block printed after each instruction.
    pub fn describe(&self) -> [String; 4] {
        let set = |s: &LiveSet| format!("[{}]", s.iter().join(", "));
        [
            format!("Life_IN  : {}", set(&self.life_in)),
            format!("Life_OUT : {}", set(&self.life_out)),
            format!("Next_IN  : {}", self.next_in),
            format!("Next_OUT : {}", self.next_out),
        ]
    }
}

/// Analyse every instruction of `program`. The result is indexed by position.
pub fn analyse(program: &StraightLine) -> Vec<LineAnalysis> {
    let mut analyses = vec![LineAnalysis::default(); program.lines().len()];
    let mut backwards: Vec<_> = program.lines().iter_lines().collect();
    backwards.reverse();

    compute_liveness(&backwards, program.returns(), &mut analyses);
    compute_next_use(&backwards, &mut analyses);

    analyses
}

/// OUT of the last instruction is the return set; OUT(i) = IN(i + 1) and
/// IN(i) = (OUT(i) - DEF(i)) ∪ REF(i).
fn compute_liveness(
    backwards: &[(Position, &Quad)],
    returns: &[String],
    analyses: &mut [LineAnalysis],
) {
    let mut live: LiveSet = returns.iter().cloned().collect();

    for (position, quad) in backwards {
        let analysis = &mut analyses[position.0];
        analysis.life_out = live;
        analysis.life_in = analysis
            .life_out
            .difference(quad.def())
            .chain(quad.refs())
            .cloned()
            .collect();
        trace!("{}: live in {:?}", position, analysis.life_in);

        live = analysis.life_in.clone();
    }
}

/// Next_OUT(i) is a copy of Next_IN(i + 1). Uses of variables not written by
/// instruction i carry over into Next_IN(i), and every variable it reads gets
/// position i recorded.
fn compute_next_use(backwards: &[(Position, &Quad)], analyses: &mut [LineAnalysis]) {
    let mut following = NextUse::default();

    for (position, quad) in backwards {
        let mut next_in = NextUse::default();
        for (var, uses) in following.iter() {
            if quad.def().contains(var) {
                continue;
            }
            for used_at in uses {
                next_in.record(var, *used_at);
            }
        }
        for var in quad.refs() {
            next_in.record(var, *position);
        }

        let analysis = &mut analyses[position.0];
        analysis.next_out = following;
        analysis.next_in = next_in.clone();
        following = next_in;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::typed::ArithOp,
        codegen::straight_line::Operand,
        config::RegisterCapacity,
        listing::Listing,
    };

    use super::*;

    macro_rules! quad {
        ($assign:literal = $left:literal $op:ident $right:literal) => {
            Quad::new(ArithOp::$op, $assign, operand($left), operand($right))
        };
    }

    fn operand(text: &str) -> Operand {
        match text.parse() {
            Ok(value) => Operand::Imm(value),
            Err(_) => Operand::var(text),
        }
    }

    fn set(vars: &[&str]) -> LiveSet {
        vars.iter().map(ToString::to_string).collect()
    }

    fn uses(positions: &[usize]) -> Option<Vec<Position>> {
        Some(positions.iter().copied().map(Position).collect())
    }

    fn sample() -> StraightLine {
        let lines: Listing<_> = [
            quad!("t" = "a" Add "b"),
            quad!("u" = "a" Sub "c"),
            quad!("v" = "t" Add "u"),
            quad!("a" = "v" Mul "2"),
            quad!("d" = "a" Add "u"),
        ]
        .into_iter()
        .collect();

        StraightLine::new(lines, vec!["d".into(), "a".into()], RegisterCapacity::default())
    }

    #[test]
    fn liveness_satisfies_dataflow_equation() {
        let program = sample();
        let analyses = analyse(&program);

        for ((_, quad), analysis) in program.lines().iter_lines().zip(&analyses) {
            let expected: LiveSet = analysis
                .life_out
                .difference(quad.def())
                .chain(quad.refs())
                .cloned()
                .collect();
            assert_eq!(expected, analysis.life_in, "at {}", quad);
        }
        assert_eq!(set(&["a", "d"]), analyses.last().unwrap().life_out);
    }

    #[test]
    fn liveness_of_sample() {
        let analyses = analyse(&sample());

        assert_eq!(set(&["a", "b", "c"]), analyses[0].life_in);
        assert_eq!(set(&["a", "c", "t"]), analyses[0].life_out);
        assert_eq!(set(&["t", "u"]), analyses[2].life_in);
        assert_eq!(set(&["u", "v"]), analyses[3].life_in);
        assert_eq!(set(&["a", "u"]), analyses[3].life_out);
    }

    #[test]
    fn life_out_of_each_line_is_life_in_of_next() {
        let analyses = analyse(&sample());

        for pair in analyses.windows(2) {
            assert_eq!(pair[0].life_out, pair[1].life_in);
        }
    }

    #[test]
    fn referenced_variables_record_current_position() {
        let program = sample();
        let analyses = analyse(&program);

        for ((position, quad), analysis) in program.lines().iter_lines().zip(&analyses) {
            for var in quad.refs() {
                let recorded = analysis.next_in.get(var).unwrap();
                assert!(recorded.contains(&position), "{} at {}", var, position);
            }
        }
    }

    #[test]
    fn defined_variables_do_not_propagate() {
        let analyses = analyse(&sample());

        // `a` is written at 3, so its use at 4 does not reach above it.
        assert_eq!(uses(&[4]), analyses[3].next_out.get("a").map(<[_]>::to_vec));
        assert_eq!(None, analyses[3].next_in.get("a"));
        assert_eq!(uses(&[0, 1]), analyses[0].next_in.get("a").map(<[_]>::to_vec));
    }

    #[test]
    fn next_uses_accumulate_in_ascending_order() {
        let analyses = analyse(&sample());

        assert_eq!(uses(&[2, 4]), analyses[2].next_in.get("u").map(<[_]>::to_vec));
        assert_eq!(uses(&[2, 4]), analyses[1].next_out.get("u").map(<[_]>::to_vec));
        assert_eq!(Some(Position(1)), analyses[0].next_out.next_use("c"));
        assert_eq!(None, analyses[4].next_out.next_use("a"));
    }

    #[test]
    fn describe_prints_sorted_sets() {
        let analyses = analyse(&sample());

        let [life_in, life_out, next_in, next_out] = analyses[0].describe();

        assert_eq!("Life_IN  : [a, b, c]", life_in);
        assert_eq!("Life_OUT : [a, c, t]", life_out);
        assert_eq!("Next_IN  : a:[0, 1], b:[0], c:[1]", next_in);
        assert_eq!("Next_OUT : a:[1], c:[1], t:[2]", next_out);
    }
}
