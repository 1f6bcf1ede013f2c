//! Headless mode for the studio.
//!
//! A line-oriented interface without a TUI, designed for scripting and
//! automated testing.

use std::io::{self, BufRead, Write};
use std::path::Path;

use touie_core::render::{self, GENERATING};
use touie_core::{
    save_pictograms, Category, GenerationResult, KeyValueStore, StoryBackend, Studio,
};

const HELP: &[&str] = &[
    "  #pictogram   - Generate pictograms from now on",
    "  #audio       - Generate audio from now on",
    "  #text        - Generate text from now on",
    "  #history [c] - Show the history (all, or one category)",
    "  #help        - Show this help",
    "  #quit        - Exit",
    "  (anything else is an idea for the current format)",
];

/// Run the line protocol over stdin and stdout.
pub async fn run_headless<B, S>(
    studio: &mut Studio<B, S>,
    category: Category,
    pictogram_dir: Option<&Path>,
) -> io::Result<()>
where
    B: StoryBackend,
    S: KeyValueStore,
{
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_protocol(studio, category, pictogram_dir, stdin.lock(), stdout.lock()).await
}

/// The protocol itself:
/// - Lines starting with `#` are commands
/// - Any other non-blank line is an idea, generated in the current format
/// - Output lines are tagged `[RESULT]`, `[ERROR]`, `[HISTORY]` and so on
pub async fn run_protocol<B, S, R, W>(
    studio: &mut Studio<B, S>,
    mut category: Category,
    pictogram_dir: Option<&Path>,
    input: R,
    mut out: W,
) -> io::Result<()>
where
    B: StoryBackend,
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    writeln!(out, "=== Touie Headless Mode ===")?;
    writeln!(out, "Backend: {}", studio.backend().name())?;
    writeln!(out, "Format: {category}")?;
    writeln!(out)?;
    writeln!(out, "Commands:")?;
    for line in HELP {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            let parts: Vec<&str> = command.split_whitespace().collect();
            match parts.first().copied() {
                Some("quit") | Some("exit") => {
                    writeln!(out, "¡Hasta pronto!")?;
                    break;
                }
                Some("help") => {
                    writeln!(out, "[HELP]")?;
                    for line in HELP {
                        writeln!(out, "{line}")?;
                    }
                }
                Some("history") => match parts.get(1) {
                    Some(name) => match name.parse::<Category>() {
                        Ok(c) => write_history(&mut out, c, studio.history().all_of(c))?,
                        Err(e) => writeln!(out, "[ERROR] {e}")?,
                    },
                    None => {
                        for c in Category::ALL {
                            write_history(&mut out, c, studio.history().all_of(c))?;
                        }
                    }
                },
                Some(name) => match name.parse::<Category>() {
                    Ok(c) => {
                        category = c;
                        writeln!(out, "[FORMAT] {category}")?;
                    }
                    Err(_) => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
                },
                None => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
            }
            out.flush()?;
            continue;
        }

        writeln!(out, "[PROCESSING] {GENERATING}")?;
        out.flush()?;

        match studio.generate(category, line).await {
            Ok(generation) => {
                writeln!(out, "[RESULT] {category}")?;
                for line in render::result_lines(&generation) {
                    writeln!(out, "{line}")?;
                }

                if let (Some(dir), GenerationResult::Pictograms(story)) =
                    (pictogram_dir, &generation.result)
                {
                    match save_pictograms(story, dir) {
                        Ok(paths) => {
                            for path in paths {
                                writeln!(out, "[SAVED] {}", path.display())?;
                            }
                        }
                        Err(e) => writeln!(out, "[ERROR] {e}")?,
                    }
                }
                writeln!(out)?;
            }
            Err(e) => {
                writeln!(out, "[ERROR] {}", render::error_message(category, &e))?;
            }
        }
        out.flush()?;
    }

    Ok(())
}

fn write_history<W: Write>(
    out: &mut W,
    category: Category,
    records: &[touie_core::HistoryRecord],
) -> io::Result<()> {
    writeln!(out, "[HISTORY] {category}")?;
    for line in render::history_lines(category, records) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use touie_core::{HistoryLog, LoadPolicy, MemoryStore, MockBackend, MockResponse};

    async fn run(
        backend: Arc<MockBackend>,
        script: &str,
        pictogram_dir: Option<&Path>,
    ) -> (String, Studio<Arc<MockBackend>, MemoryStore>) {
        let history = HistoryLog::load(MemoryStore::new(), LoadPolicy::Strict).unwrap();
        let mut studio = Studio::new(backend, history);
        let mut out = Vec::new();
        run_protocol(
            &mut studio,
            Category::Text,
            pictogram_dir,
            script.as_bytes(),
            &mut out,
        )
        .await
        .unwrap();
        (String::from_utf8(out).unwrap(), studio)
    }

    #[tokio::test]
    async fn test_ideas_are_generated_and_recorded() {
        let backend = Arc::new(MockBackend::new(vec![
            MockResponse::story("Había una vez un gato."),
            MockResponse::voice("/tmp/gato.wav"),
        ]));
        let (out, studio) = run(backend, "un gato\n#audio\nun gato que canta\n", None).await;

        assert!(out.contains("[RESULT] text\nTu Historia en Texto\nHabía una vez un gato."));
        assert!(out.contains("[FORMAT] audio"));
        assert!(out.contains("Archivo: /tmp/gato.wav"));
        assert_eq!(studio.history().len(Category::Text), 1);
        assert_eq!(studio.history().all_of(Category::Audio)[0].input, "un gato que canta");
    }

    #[tokio::test]
    async fn test_errors_are_tagged() {
        let backend = Arc::new(MockBackend::new(vec![MockResponse::status(503, "busy")]));
        let (out, studio) = run(backend, "#pictograma\nun dragón\n#dance\n", None).await;

        assert!(out.contains("[ERROR] Error al generar los pictogramas: API error (status 503): busy"));
        assert!(out.contains("[ERROR] Unknown command. Type #help for help."));
        assert!(studio.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_command() {
        let backend = Arc::new(MockBackend::default());
        let (out, _) = run(backend, "un pez\n#history\n#history texto\n#history dragons\n", None).await;

        assert!(out.contains("[HISTORY] pictogram\nAún no hay historias de pictogramas."));
        assert!(out.contains("[HISTORY] audio\nAún no hay historias de audio."));
        assert_eq!(out.matches("  Idea: un pez").count(), 2);
        assert!(out.contains("[ERROR]"));
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let backend = Arc::new(MockBackend::default());
        let (out, studio) = run(backend.clone(), "#quit\nnever sent\n", None).await;

        assert!(out.contains("¡Hasta pronto!"));
        assert_eq!(backend.call_count(), 0);
        assert!(studio.history().is_empty());
    }

    #[tokio::test]
    async fn test_pictograms_are_saved() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("pictogramas");
        let backend = Arc::new(MockBackend::new(vec![MockResponse::pictograms(
            "Un perro corre.",
            &["perro", "correr"],
        )]));
        let (out, _) = run(backend, "#pictogram\nun perro\n", Some(&dir)).await;

        assert!(out.contains("1. perro"));
        assert!(out.contains(&format!("[SAVED] {}", dir.join("pictograma_02.png").display())));
        assert!(dir.join("pictograma_01.png").exists());
    }
}
