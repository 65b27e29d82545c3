use crate::error::{ExperimentError, Result};
use cogex_core::ParticipantId;
use std::io::{BufRead, Write};

/// Writes `prompt`, then reads and validates one line as a participant id.
pub fn prompt_participant<R, W>(input: &mut R, out: &mut W, prompt: &str) -> Result<ParticipantId>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ExperimentError::NoParticipantEntered);
    }
    Ok(ParticipantId::new(&line)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::CoreError;
    use std::io::Cursor;

    #[test]
    fn trims_the_entered_id() {
        let mut input = Cursor::new(b"  p12 \n".to_vec());
        let mut out = Vec::new();
        let id = prompt_participant(&mut input, &mut out, "Enter participant ID: ").unwrap();
        assert_eq!(id.as_str(), "p12");
        assert_eq!(String::from_utf8(out).unwrap(), "Enter participant ID: ");
    }

    #[test]
    fn rejects_blank_and_closed_input() {
        let mut out = Vec::new();
        assert!(matches!(
            prompt_participant(&mut Cursor::new(b"\n".to_vec()), &mut out, "> "),
            Err(ExperimentError::Core(CoreError::EmptyParticipantId))
        ));
        assert!(matches!(
            prompt_participant(&mut Cursor::new(Vec::new()), &mut out, "> "),
            Err(ExperimentError::NoParticipantEntered)
        ));
    }
}
