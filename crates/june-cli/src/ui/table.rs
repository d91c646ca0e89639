//! Table rendering for CLI output using comfy-table.
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `june retrieve` | `render_retrieval_table()` |
//! | `june chunks` | `render_chunks_table()` |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use june_core::{KnowledgeChunk, ScoredChunk};

use super::format::{preview, truncate_str};

/// Render ranked retrieval results for `june retrieve`.
///
/// ```text
/// #  CHUNK                 CATEGORY   SCORE  KW  PART  TITLE  BODY  CAT
/// 1  personal-2            personal      27  10     3      5     1    8
/// ```
pub fn render_retrieval_table(results: &[ScoredChunk<'_>]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("#").set_alignment(CellAlignment::Right),
        Cell::new("CHUNK"),
        Cell::new("CATEGORY"),
        Cell::new("SCORE").set_alignment(CellAlignment::Right),
        Cell::new("KW").set_alignment(CellAlignment::Right),
        Cell::new("PART").set_alignment(CellAlignment::Right),
        Cell::new("TITLE").set_alignment(CellAlignment::Right),
        Cell::new("BODY").set_alignment(CellAlignment::Right),
        Cell::new("CAT").set_alignment(CellAlignment::Right),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(2)),
        ColumnConstraint::LowerBoundary(Width::Fixed(20)),
        ColumnConstraint::LowerBoundary(Width::Fixed(10)),
    ]);

    for (rank, scored) in results.iter().enumerate() {
        let b = &scored.breakdown;
        table.add_row(vec![
            Cell::new(rank + 1).set_alignment(CellAlignment::Right),
            Cell::new(truncate_str(&scored.chunk.id, 24)),
            Cell::new(scored.chunk.category.as_str()),
            Cell::new(scored.score).set_alignment(CellAlignment::Right),
            Cell::new(b.keyword).set_alignment(CellAlignment::Right),
            Cell::new(b.partial).set_alignment(CellAlignment::Right),
            Cell::new(b.title).set_alignment(CellAlignment::Right),
            Cell::new(b.content).set_alignment(CellAlignment::Right),
            Cell::new(b.category).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

/// Render the knowledge chunk listing for `june chunks`.
///
/// The title column is truncated to keep rows on one line; `width` is the
/// available terminal width.
pub fn render_chunks_table<'a, I>(chunks: I, width: usize) -> String
where
    I: IntoIterator<Item = &'a KnowledgeChunk>,
{
    let chunks: Vec<&KnowledgeChunk> = chunks.into_iter().collect();
    if chunks.is_empty() {
        return String::new();
    }

    // id + category + keyword count + padding
    let fixed = 24 + 12 + 6 + 8;
    let title_width = width.saturating_sub(fixed).clamp(20, 60);

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("CHUNK"),
        Cell::new("CATEGORY"),
        Cell::new("KEYWORDS").set_alignment(CellAlignment::Right),
        Cell::new("TITLE"),
    ]);

    for chunk in chunks {
        table.add_row(vec![
            Cell::new(truncate_str(&chunk.id, 24)),
            Cell::new(chunk.category.as_str()),
            Cell::new(chunk.keywords.len()).set_alignment(CellAlignment::Right),
            Cell::new(preview(&chunk.title, title_width)),
        ]);
    }

    table.to_string()
}
