//! Lexer and parser for the planner's textual action trace.
//!
//! The planner prints something like:
//!
//! ```text
//! ff: found legal plan as follows
//!
//! step    0: START-DAY PLACE1 JAN062025
//!         1: VISIT PLACE1 JAN062025
//!         2: END-DAY PLACE1 JAN062025
//!
//! plan cost: 3.000000
//! ```
//!
//! Matching is case-insensitive. Extra action arguments (days, clock values)
//! are ignored; only the place arguments matter for replay.

use thiserror::Error;

/// Marker line the planner prints when it found a plan.
pub const PLAN_FOUND: &str = "found legal plan as follows";

const STEPS_BEGIN: &str = "step";
const STEPS_END: &str = "plan cost";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("planner output contains no plan")]
    NoPlan,
    #[error("unknown action '{action}' at step {step}")]
    UnknownAction { step: usize, action: String },
    #[error("action '{action}' at step {step} is missing an argument")]
    MissingArgument { step: usize, action: String },
    #[error("wait started at step {0} never ends")]
    UnterminatedWait(usize),
    #[error("wait ended at step {0} without starting")]
    UnexpectedEndWait(usize),
    #[error("action '{action}' at step {step} interrupts a wait")]
    UnexpectedInWait { step: usize, action: String },
}

/// One replayable action of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartDay { place: String },
    Move { from: String, to: String },
    Visit { place: String },
    EndDay { place: String },
    ChangeDay,
    /// A run of 15-minute wait ticks between `start-wait` and `end-wait`.
    WaitRun { ticks: u32 },
}

/// One step line: action name and its arguments, lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    index: usize,
    name: String,
    args: Vec<String>,
}

/// Parse planner output into actions.
pub fn parse(output: &str) -> Result<Vec<Action>, TraceError> {
    let steps = lex(output)?;
    let mut actions = Vec::with_capacity(steps.len());
    let mut iter = steps.into_iter();

    while let Some(step) = iter.next() {
        let action = match step.name.as_str() {
            "start-wait" => {
                let mut ticks = 0;
                loop {
                    match iter.next() {
                        Some(next) if next.name == "end-wait" => break,
                        Some(next) if next.name == "wait" => ticks += 1,
                        Some(next) => {
                            return Err(TraceError::UnexpectedInWait {
                                step: next.index,
                                action: next.name,
                            });
                        }
                        None => return Err(TraceError::UnterminatedWait(step.index)),
                    }
                }
                Action::WaitRun { ticks }
            }
            "end-wait" => return Err(TraceError::UnexpectedEndWait(step.index)),
            "start-day" => Action::StartDay {
                place: step.arg(0)?,
            },
            "move" => Action::Move {
                from: step.arg(0)?,
                to: step.arg(1)?,
            },
            "visit" => Action::Visit {
                place: step.arg(0)?,
            },
            "end-day" => Action::EndDay {
                place: step.arg(0)?,
            },
            "change-day" => Action::ChangeDay,
            _ => {
                return Err(TraceError::UnknownAction {
                    step: step.index,
                    action: step.name,
                })
            }
        };
        actions.push(action);
    }

    Ok(actions)
}

impl Step {
    fn arg(&self, position: usize) -> Result<String, TraceError> {
        self.args
            .get(position)
            .cloned()
            .ok_or_else(|| TraceError::MissingArgument {
                step: self.index,
                action: self.name.clone(),
            })
    }
}

/// Cut the step block out of the planner output and split it into steps.
fn lex(output: &str) -> Result<Vec<Step>, TraceError> {
    let output = output.to_lowercase();
    let found = output.find(PLAN_FOUND).ok_or(TraceError::NoPlan)?;
    let rest = &output[found + PLAN_FOUND.len()..];

    let Some(begin) = rest.find(STEPS_BEGIN) else {
        return Ok(Vec::new());
    };
    let block = &rest[begin + STEPS_BEGIN.len()..];
    let block = match block.find(STEPS_END) {
        Some(end) => &block[..end],
        None => block,
    };

    let mut steps = Vec::new();
    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(step) = lex_line(line) else {
            break;
        };
        steps.push(step);
    }
    Ok(steps)
}

/// `12: move place1 place2` -> step 12.
fn lex_line(line: &str) -> Option<Step> {
    let (index, body) = line.split_once(':')?;
    let index: usize = index.trim().parse().ok()?;
    let mut words = body.split_whitespace().map(str::to_string);
    let name = words.next()?;
    Some(Step {
        index,
        name,
        args: words.collect(),
    })
}
