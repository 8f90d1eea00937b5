use docqa_core::types::RetrievalResult;

/// A grounding prompt plus the ranked texts that made it into the context.
#[derive(Debug, Clone)]
pub struct GroundingPrompt {
    pub text: String,
    /// Chunk texts exactly as placed, in rank order. The last one may be cut
    /// short by the budget.
    pub placed: Vec<String>,
    pub context_chars: usize,
}

impl GroundingPrompt {
    /// How many ranked results appear in the context.
    pub fn used(&self) -> usize { self.placed.len() }
}

/// Concatenate ranked chunk texts into numbered context blocks, bounded by
/// `char_budget` characters.
///
/// Blocks are added whole while they fit. The first block that does not fit
/// is cut on a character boundary to the remaining budget and assembly stops
/// there. The top-ranked block is always present with at least one character
/// of text, even when the budget cannot hold its header.
pub fn build_context(results: &[RetrievalResult], char_budget: usize) -> (String, Vec<String>) {
    const SEP: &str = "\n\n";
    let mut context = String::new();
    let mut placed: Vec<String> = Vec::new();
    let mut used_chars = 0usize;
    for (idx, r) in results.iter().enumerate() {
        let sep = if placed.is_empty() { 0 } else { SEP.len() };
        let header = format!("[Context {}]: ", idx + 1);
        let header_chars = header.chars().count();
        let block_chars = header_chars + r.chunk.text.chars().count();
        let remaining = char_budget.saturating_sub(used_chars + sep);
        let text: String = if block_chars <= remaining {
            r.chunk.text.clone()
        } else if remaining > header_chars {
            r.chunk.text.chars().take(remaining - header_chars).collect()
        } else if placed.is_empty() {
            r.chunk.text.chars().take(1).collect()
        } else {
            break;
        };
        let truncated = text.len() < r.chunk.text.len();
        if sep > 0 { context.push_str(SEP); }
        context.push_str(&header);
        context.push_str(&text);
        used_chars += sep + header_chars + text.chars().count();
        placed.push(text);
        if truncated { break; }
    }
    (context, placed)
}

pub fn grounding_prompt(question: &str, results: &[RetrievalResult], char_budget: usize) -> GroundingPrompt {
    let (context, placed) = build_context(results, char_budget);
    let context_chars = context.chars().count();
    // Contract with the model:
    // - answer ONLY from the context blocks
    // - say so when the context is not enough
    let text = format!(
        r#"You are a helpful assistant that answers questions based on the provided context.

Context:
{context}

Question: {question}

Instructions:
- Answer the question based ONLY on the information in the context above
- If the context doesn't contain enough information to answer the question, say so
- Be concise and specific
- Cite which context sections you used if relevant

Answer:"#
    );
    GroundingPrompt { text, placed, context_chars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::types::Chunk;
    use std::sync::Arc;

    fn hit(id: usize, text: &str) -> RetrievalResult {
        RetrievalResult { chunk: Arc::new(Chunk { id, text: text.into(), embedding: vec![1.0] }), score: 0.5 }
    }

    #[test]
    fn keeps_rank_order_and_question() {
        let results = [hit(4, "second ranked first"), hit(0, "then this")];
        let p = grounding_prompt("What comes first?", &results, 10_000);
        assert_eq!(p.used(), 2);
        assert_eq!(p.placed, vec!["second ranked first".to_string(), "then this".to_string()]);
        let a = p.text.find("[Context 1]: second ranked first").expect("block 1");
        let b = p.text.find("[Context 2]: then this").expect("block 2");
        assert!(a < b);
        assert!(p.text.contains("Question: What comes first?"));
        assert!(p.text.contains("ONLY"));
    }

    #[test]
    fn budget_truncates_and_stops() {
        let results = [hit(0, "aaaaaaaaaa"), hit(1, "bbbbbbbbbb"), hit(2, "cccccccccc")];
        // "[Context 1]: " is 13 chars, each block 23, separators 2.
        let (ctx, placed) = build_context(&results, 23 + 2 + 18);
        assert_eq!(placed, vec!["aaaaaaaaaa".to_string(), "bbbbb".to_string()]);
        assert!(ctx.ends_with("[Context 2]: bbbbb"));
        assert!(!ctx.contains("ccc"));
    }

    #[test]
    fn truncation_respects_multibyte_chars() {
        let results = [hit(0, "ééééééééé")];
        let (ctx, placed) = build_context(&results, 15);
        assert_eq!(placed, vec!["éé".to_string()]);
        assert_eq!(ctx, "[Context 1]: éé");
    }

    #[test]
    fn top_block_survives_a_budget_smaller_than_its_header() {
        let results = [hit(0, "needle in the text"), hit(1, "second")];
        for budget in [1, 10, 13] {
            let (ctx, placed) = build_context(&results, budget);
            assert_eq!(placed, vec!["n".to_string()], "budget {budget}");
            assert_eq!(ctx, "[Context 1]: n");
        }
        let (_, placed) = build_context(&[], 10);
        assert!(placed.is_empty());
    }
}
