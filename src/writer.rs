use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{LapDashError, session::Session};

/// Writes sessions to a JSON lines file readable by `JsonlSessionProvider`.
/// Sessions are appended when `append` is set, otherwise the file is replaced.
pub fn write_sessions(file: &Path, sessions: &[Session], append: bool) -> Result<(), LapDashError> {
    let session_file = if append {
        OpenOptions::new().create(true).append(true).open(file)
    } else {
        File::create(file)
    }
    .map_err(|e| LapDashError::WriterError { source: e })?;

    let mut session_file_writer = BufWriter::new(session_file);
    for session in sessions {
        let line = serde_json::to_string(session)
            .map_err(|e| LapDashError::WriterSerializeError { source: e })?;
        writeln!(session_file_writer, "{}", line)
            .map_err(|e| LapDashError::WriterError { source: e })?;
    }
    session_file_writer
        .flush()
        .map_err(|e| LapDashError::WriterError { source: e })?;
    info!("Wrote {} sessions to {:?}", sessions.len(), file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{JsonlSessionProvider, SessionProvider};
    use crate::session::{SessionKey, SessionType, tests::monza_session};
    use tempfile::TempDir;

    #[test]
    fn test_written_sessions_load_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let mut qualifying = monza_session();
        qualifying.key = SessionKey::new(2023, "Monza", SessionType::Q);
        write_sessions(&path, &[monza_session()], false).unwrap();
        write_sessions(&path, &[qualifying.clone()], true).unwrap();

        let provider = JsonlSessionProvider::from_file(&path).unwrap();
        assert_eq!(provider.keys().count(), 2);
        assert_eq!(provider.load_session(&qualifying.key).unwrap(), qualifying);
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        write_sessions(&path, &[monza_session(), monza_session()], false).unwrap();
        write_sessions(&path, &[monza_session()], false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_serialize_failures_are_reported_as_export_errors() {
        let source = serde_json::from_str::<Session>("{").unwrap_err();
        let error = LapDashError::WriterSerializeError { source };
        assert_eq!(error.to_string(), "Error serializing session for export");
    }
}
