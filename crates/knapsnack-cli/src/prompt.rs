//! Line-oriented wizard driver for the terminal.
//!
//! Each step prints its title, the current answer and any error, then reads
//! one line:
//! - an answer sets the field and moves on
//! - an empty line keeps the current answer and moves on
//! - `:back` returns to the previous step
//! - `:quit` (or end of input) stops, keeping saved progress
//!
//! On the macro step the answer is three shares, `protein carbohydrate fats`.

use knapsnack::IntakeSession;
use knapsnack_core::{Channel, FieldKey, FormData, KeyValueSlot, Transition};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// How the interactive run ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    /// The wizard was submitted with this form.
    Submitted(FormData),
    /// The user stopped early; progress stays saved.
    Stopped,
}

/// Drive `session` from `input` until it is submitted or the user stops.
pub(crate) fn run<K, R, W>(session: &mut IntakeSession<K>, input: R, mut output: W) -> io::Result<Outcome>
where
    K: KeyValueSlot,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        render(session, &mut output)?;
        let Some(line) = lines.next().transpose()? else {
            writeln!(output, "Progress saved.")?;
            return Ok(Outcome::Stopped);
        };
        let line = line.trim();

        match line {
            ":quit" | ":q" => {
                writeln!(output, "Progress saved.")?;
                return Ok(Outcome::Stopped);
            }
            ":back" | ":b" => {
                session.previous();
                continue;
            }
            "" => {}
            answer => {
                if let Err(message) = apply(session, answer) {
                    writeln!(output, "  ! {message}")?;
                    continue;
                }
            }
        }

        match session.next() {
            Transition::Submitted(form) => {
                writeln!(output, "Intake complete.")?;
                return Ok(Outcome::Submitted(form));
            }
            Transition::Advanced { step } => debug!(step, "advanced"),
            Transition::Blocked { .. } => {}
        }
    }
}

fn render<K: KeyValueSlot, W: Write>(session: &IntakeSession<K>, output: &mut W) -> io::Result<()> {
    let view = session.view();
    let wizard = &view.wizard;
    writeln!(output)?;
    writeln!(
        output,
        "[{}/{}] {}",
        wizard.step + 1,
        wizard.step_count,
        wizard.title
    )?;
    match &view.ratios {
        Some(r) => writeln!(
            output,
            "  protein {}%  carbohydrate {}%  fats {}%  (total {}%, must equal 100%)",
            r.protein, r.carbohydrate, r.fats, r.total
        )?,
        None => writeln!(output, "  current: {}", current_answer(&wizard.data, wizard.field))?,
    }
    if let Some(error) = &wizard.error {
        writeln!(output, "  ! {error}")?;
    }
    write!(output, "> ")?;
    output.flush()
}

fn current_answer(form: &FormData, field: FieldKey) -> String {
    serde_json::to_value(form)
        .map(|json| json[field.as_str()].to_string())
        .unwrap_or_default()
}

/// Apply one typed answer to the current step.
fn apply<K: KeyValueSlot>(session: &mut IntakeSession<K>, answer: &str) -> Result<(), String> {
    let field = session.wizard().current_descriptor().field();
    if field == FieldKey::MacroRatios {
        let shares: Vec<i64> = answer
            .split(|c: char| c.is_whitespace() || c == ',' || c == '/')
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| "enter three whole numbers: protein carbohydrate fats".to_string())?;
        if shares.len() != Channel::ALL.len() {
            return Err("enter three whole numbers: protein carbohydrate fats".to_string());
        }
        for (channel, share) in Channel::ALL.into_iter().zip(shares) {
            session
                .set_channel(channel.as_str(), share)
                .map_err(|e| e.to_string())?;
        }
        return Ok(());
    }

    session
        .edit_field(field.as_str(), answer_json(field, answer))
        .map_err(|e| e.to_string())
}

fn answer_json(field: FieldKey, answer: &str) -> serde_json::Value {
    match field {
        FieldKey::Activity | FieldKey::Percentage => answer
            .parse::<serde_json::Number>()
            .map_or_else(|_| answer.into(), serde_json::Value::Number),
        FieldKey::Gender => match answer.to_ascii_lowercase().as_str() {
            "male" | "m" => "m".into(),
            "female" | "f" => "f".into(),
            other => other.into(),
        },
        FieldKey::SmokingStatus => match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => "yes".into(),
            "n" | "no" => "no".into(),
            other => other.into(),
        },
        _ => answer.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knapsnack_core::{
        Entry, MacroRatios, MemorySlot, SmokingStatus, StepCatalog, RATIO_GATE_MESSAGE,
    };
    use std::rc::Rc;

    fn drive(script: &str) -> (Outcome, String, IntakeSession<Rc<MemorySlot>>) {
        let slot = Rc::new(MemorySlot::new());
        let mut session = IntakeSession::with_catalog(StepCatalog::default(), slot);
        let mut out = Vec::new();
        let outcome = run(&mut session, script.as_bytes(), &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap(), session)
    }

    #[test]
    fn test_full_run() {
        let script = "f\n30\n70\n175\n1.55\nyes\n95\n40 30 30\n";
        let (outcome, out, _) = drive(script);
        let Outcome::Submitted(form) = outcome else {
            panic!("expected submission, got {outcome:?}\n{out}");
        };
        assert_eq!(form.age, Entry::from("30"));
        assert_eq!(form.activity, 1.55);
        assert_eq!(form.percentage, 95);
        assert_eq!(form.smoking_status, SmokingStatus::Yes);
        assert_eq!(form.macro_ratios, MacroRatios::new(40, 30, 30));
        assert!(out.contains("[1/8] First, what's your gender?"));
        assert!(out.contains("Intake complete."));
    }

    #[test]
    fn test_validation_error_is_shown_and_step_kept() {
        let (outcome, out, session) = drive("\n12\n");
        assert_eq!(outcome, Outcome::Stopped);
        assert!(out.contains("! Age must be between 19 and 100"));
        assert_eq!(session.wizard().current_step(), 1);
    }

    #[test]
    fn test_back_and_quit() {
        let (outcome, out, session) = drive("\n:back\n:quit\n");
        assert_eq!(outcome, Outcome::Stopped);
        assert_eq!(session.wizard().current_step(), 0);
        assert!(out.contains("Progress saved."));
    }

    #[test]
    fn test_bad_ratio_input() {
        let script = "\n30\n70\n175\n\n\n\n40 30\n";
        let (_, out, session) = drive(script);
        assert!(out.contains("enter three whole numbers"));
        assert_eq!(session.wizard().current_step(), 7);
        assert!(out.contains("total 100%"));
    }

    #[test]
    fn test_unbalanced_ratios_block_submission() {
        let script = "\n30\n70\n175\n\n\n\n50 30 30\n";
        let (outcome, out, _) = drive(script);
        assert_eq!(outcome, Outcome::Stopped);
        assert!(out.contains(&format!("! {RATIO_GATE_MESSAGE}")));
        assert!(out.contains("total 110%"));
    }

    #[test]
    fn test_bad_gender_reports_error() {
        let (_, out, session) = drive("x\n");
        assert!(out.contains("! invalid value for 'gender'"));
        assert_eq!(session.wizard().current_step(), 0);
    }

    #[test]
    fn test_answer_json() {
        assert_eq!(answer_json(FieldKey::Percentage, "110"), serde_json::json!(110));
        assert_eq!(answer_json(FieldKey::Activity, "1.2"), serde_json::json!(1.2));
        assert_eq!(answer_json(FieldKey::Age, "33"), serde_json::json!("33"));
        assert_eq!(answer_json(FieldKey::Gender, "Female"), serde_json::json!("f"));
        assert_eq!(answer_json(FieldKey::SmokingStatus, "N"), serde_json::json!("no"));
    }
}
