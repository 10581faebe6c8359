use papersmith_core::RetrievalResult;

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8000;
pub const DEFAULT_MIN_TRUNCATED_CHARS: usize = 100;

const SEPARATOR: &str = "\n\n";
const ELLIPSIS: &str = "...";

/// Turns retrieval results into one bounded context string.
///
/// Results are taken best first (ties keep retrieval order), each labelled
/// with its unit and joined by blank lines. The first result that does not
/// fit is cut to the remaining budget and marked with `...` when more than
/// `min_truncated_chars` remain, otherwise dropped; nothing after it is
/// considered. The output never exceeds `max_chars` characters.
#[derive(Clone, Debug)]
pub struct ContextAssembler {
    max_chars: usize,
    min_truncated_chars: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_CHARS)
    }
}

impl ContextAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            min_truncated_chars: DEFAULT_MIN_TRUNCATED_CHARS,
        }
    }

    pub fn with_min_truncated_chars(mut self, value: usize) -> Self {
        self.min_truncated_chars = value;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn assemble(&self, results: &[RetrievalResult]) -> String {
        let mut ordered: Vec<&RetrievalResult> = results.iter().collect();
        ordered.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        let separator_len = SEPARATOR.chars().count();
        let ellipsis_len = ELLIPSIS.chars().count();
        let mut context = String::new();
        let mut used = 0usize;

        for result in ordered {
            let part = format!(
                "[Unit {}] {}",
                result.chunk.metadata.unit_number, result.chunk.content
            );
            let part_len = part.chars().count();
            let lead = if context.is_empty() { 0 } else { separator_len };

            if used + lead + part_len <= self.max_chars {
                if lead > 0 {
                    context.push_str(SEPARATOR);
                }
                context.push_str(&part);
                used += lead + part_len;
                continue;
            }

            let remaining = self.max_chars.saturating_sub(used + lead);
            if remaining > self.min_truncated_chars && remaining > ellipsis_len {
                if lead > 0 {
                    context.push_str(SEPARATOR);
                }
                context.extend(part.chars().take(remaining - ellipsis_len));
                context.push_str(ELLIPSIS);
            }
            break;
        }

        context
    }
}
