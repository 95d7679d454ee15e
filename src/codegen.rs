//! Code generator — flattens a session AST into step-indexed watch code.
//!
//! Each leaf run-step is emitted as one guarded block selected by the
//! device's `step` variable. A repeat block does not duplicate its body:
//! every child is emitted once, guarded by a disjunction over all the step
//! numbers the child occupies across the repetitions. Step numbers are
//! assigned in a single left-to-right traversal and cover a contiguous
//! range with no gaps.

use crate::ast::{Remaining, RunStep, Session, Step};

/// Which of the two device programs to emit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Shows how much time/distance is left in the current step.
    Remaining,
    /// Shows whether the athlete is above, below, or on target.
    Target,
}

/// Emit the program text for one mode. Pure function of the AST; the two
/// modes are independent walks and can run in either order.
pub fn generate(session: &Session, mode: Mode) -> String {
    let mut occurrences = Vec::new();
    collect_occurrences(&session.steps, 0, &mut occurrences);

    let mut out = String::new();
    for (step_numbers, run) in &occurrences {
        let guard: Vec<String> = step_numbers.iter().map(|n| format!("step == {n}")).collect();
        out.push_str(&format!("if ({}) {{\n", guard.join(" || ")));
        match mode {
            Mode::Remaining => push_remaining_body(&mut out, run),
            Mode::Target => push_target_body(&mut out, run),
        }
        out.push_str("}\n\n");
    }
    out
}

/// Map every leaf run-step to the sorted step numbers at which it is
/// active, threading the step counter through the recursion. Returns the
/// counter value after the given steps.
fn collect_occurrences<'a>(
    steps: &'a [Step],
    base: usize,
    out: &mut Vec<(Vec<usize>, &'a RunStep)>,
) -> usize {
    let mut next = base;
    for step in steps {
        match step {
            Step::Run(run) => {
                out.push((vec![next], run));
                next += 1;
            }
            Step::Repeat(rep) => {
                let k = rep.step_count();
                // one pass over the children, numbered from `next`
                let mut pass = Vec::new();
                collect_occurrences(&rep.steps, next, &mut pass);
                for (numbers, run) in pass {
                    let expanded: Vec<usize> = (0..rep.count as usize)
                        .flat_map(|r| numbers.iter().map(move |n| n + r * k))
                        .collect();
                    out.push((expanded, run));
                }
                next += rep.count as usize * k;
            }
        }
    }
    next
}

fn push_remaining_body(out: &mut String, run: &RunStep) {
    let rem = &run.remaining;
    out.push_str(&format!("  prefix = \"{}\";\n", rem.prefix));
    out.push_str(&format!("  postfix = \"{}\";\n", rem.postfix));

    if rem.duration != 0 {
        out.push_str(&format!(
            "  RESULT = last_step_duration + {} - SUUNTO_DURATION;\n",
            rem.duration
        ));
    } else if rem.distance != 0.0 {
        out.push_str(&format!(
            "  RESULT = last_step_distance + {} - SUUNTO_DISTANCE;\n",
            rem.distance
        ));
    } else if rem.lap_terminated {
        out.push_str("  RESULT = SUUNTO_LAP_DURATION;\n");
    }

    push_transition(out, rem, true);
}

fn push_target_body(out: &mut String, run: &RunStep) {
    if let Some(target) = &run.target {
        if target.heart_rate != 0.0 {
            out.push_str(&format!("  prefix = \"{}\";\n", target.effective_prefix()));
            out.push_str(&format!("  RESULT = {};\n", target.heart_rate));
            push_classification(
                out,
                target.hr_min,
                target.hr_max,
                "(SUUNTO_HR * 100 / SUUNTO_USER_MAX_HR)",
            );
        } else if target.speed != 0.0 {
            out.push_str(&format!("  prefix = \"{}\";\n", target.effective_prefix()));
            out.push_str(&format!("  RESULT = {};\n", target.speed));
            push_classification(out, target.spd_min, target.spd_max, "SUUNTO_SPEED");
        }
    }

    push_transition(out, &run.remaining, false);
}

/// Three-way postfix classification against `[min, max]`.
fn push_classification(out: &mut String, min: f64, max: f64, reading: &str) {
    out.push_str(&format!("  if ({max} < {reading}) {{\n"));
    out.push_str("    postfix = \"++\";\n");
    out.push_str("  }\n");
    out.push_str(&format!("  else if ({min} > {reading}) {{\n"));
    out.push_str("    postfix = \"--\";\n");
    out.push_str("  }\n");
    out.push_str("  else {\n");
    out.push_str("    postfix = \"ok\";\n");
    out.push_str("  }\n");
}

/// The step-completion test shared by both programs: on reaching the
/// threshold (or a manual lap press), record the device readings and
/// advance `step` by one.
fn push_transition(out: &mut String, rem: &Remaining, with_alert: bool) {
    if rem.duration != 0 {
        out.push_str(&format!(
            "  if (SUUNTO_DURATION - last_step_duration >= {}) {{\n",
            rem.duration
        ));
    } else if rem.distance != 0.0 {
        out.push_str(&format!(
            "  if (SUUNTO_DISTANCE - last_step_distance >= {}) {{\n",
            rem.distance
        ));
    } else if rem.lap_terminated {
        out.push_str("  if (SUUNTO_LAP_NUMBER > current_lap_number) {\n");
        out.push_str("    current_lap_number = current_lap_number + 1;\n");
    } else {
        // a step with no duration, distance, or lap never completes
        out.push_str("  if (0) {\n");
    }

    out.push_str("    last_step_duration = SUUNTO_DURATION;\n");
    out.push_str("    last_step_distance = SUUNTO_DISTANCE;\n");
    if with_alert {
        out.push_str("    Suunto.alarmBeep();\n");
        out.push_str("    Suunto.light();\n");
    }
    out.push_str("    step = step + 1;\n");
    out.push_str("  }\n");
}
