//! User-facing text.
//!
//! Every frontend shows the same words, so they live here rather than in the
//! terminal UI or the line protocol.

use crate::history::{Category, HistoryRecord};
use crate::studio::{Generation, GenerationResult, StudioError};

pub const EMPTY_PROMPT: &str = "¡Ups! Primero escribe tu idea arriba.";
pub const GENERATING: &str = "¡Touie está creando tu historia!";
pub const NO_PICTOGRAMS: &str = "No se generaron pictogramas.";
pub const NOT_SAVED: &str = "No se pudo guardar en el historial.";
pub const LISTEN: &str = "¡Escucha tu increíble historia!";

/// Tab title for a category.
pub fn category_title(category: Category) -> &'static str {
    match category {
        Category::Pictogram => "Pictogramas",
        Category::Audio => "Audio",
        Category::Text => "Texto",
    }
}

/// Heading shown above a generated result.
pub fn result_heading(category: Category) -> &'static str {
    match category {
        Category::Pictogram => "Tu Historia en Pictogramas",
        Category::Audio => "Tu Historia en Audio",
        Category::Text => "Tu Historia en Texto",
    }
}

/// Placeholder for an empty history list.
pub fn empty_history(category: Category) -> &'static str {
    match category {
        Category::Pictogram => "Aún no hay historias de pictogramas.",
        Category::Audio => "Aún no hay historias de audio.",
        Category::Text => "Aún no hay historias de texto.",
    }
}

fn failed_subject(category: Category) -> &'static str {
    match category {
        Category::Pictogram => "los pictogramas",
        Category::Audio => "la voz",
        Category::Text => "la historia",
    }
}

/// The message shown when `category` generation fails.
pub fn error_message(category: Category, error: &StudioError) -> String {
    match error {
        StudioError::EmptyPrompt => EMPTY_PROMPT.to_string(),
        StudioError::Generation { source, .. } => {
            format!("Error al generar {}: {source}", failed_subject(category))
        }
        StudioError::History(e) => format!("Error en el historial: {e}"),
    }
}

/// Lines describing a finished generation, heading first.
pub fn result_lines(generation: &Generation) -> Vec<String> {
    let mut lines = vec![result_heading(generation.category).to_string()];

    match &generation.result {
        GenerationResult::Text(story) => {
            lines.extend(story.text.lines().map(str::to_string));
        }
        GenerationResult::Audio(clip) => {
            lines.push(LISTEN.to_string());
            if clip.audio_path.is_empty() {
                lines.push(format!(
                    "(Simulación de audio de: \"{}\")",
                    generation.record.input
                ));
            } else {
                lines.push(format!("Archivo: {}", clip.audio_path));
            }
            if let Some(duration) = clip.duration {
                lines.push(format!("Duración: {duration:.1} s"));
            }
            if let Some(voice) = &clip.voice_used {
                lines.push(format!("Voz: {voice}"));
            }
        }
        GenerationResult::Pictograms(story) => {
            lines.extend(story.story.lines().map(str::to_string));
            if story.pictograms.items.is_empty() {
                lines.push(NO_PICTOGRAMS.to_string());
            } else {
                lines.push(String::new());
                for (i, item) in story.pictograms.items.iter().enumerate() {
                    let caption = item.caption().unwrap_or("Pictograma");
                    lines.push(format!("{}. {caption}", i + 1));
                }
            }
        }
    }

    if !generation.saved {
        lines.push(NOT_SAVED.to_string());
    }
    lines
}

/// The two lines of a history entry: date, then the idea.
pub fn history_entry(record: &HistoryRecord) -> [String; 2] {
    [record.date.clone(), format!("Idea: {}", record.input)]
}

/// A whole category as text, newest first.
pub fn history_lines(category: Category, records: &[HistoryRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec![empty_history(category).to_string()];
    }
    records
        .iter()
        .flat_map(|record| {
            let [date, idea] = history_entry(record);
            [date, format!("  {idea}")]
        })
        .collect()
}
