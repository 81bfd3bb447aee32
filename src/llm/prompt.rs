//! Prompt construction for the analysis request.

/// Instruction placed before the question.
const INSTRUCTION: &str = "Analyze the following CSV data.";

/// Builds the prompt from the user's question and the serialized table.
///
/// An empty table still yields a complete prompt; its data section then
/// holds only the header line.
pub fn build_prompt(question: &str, csv_data: &str) -> String {
    format!("{INSTRUCTION}\n\nQuestion: {question}\n\nData:\n{csv_data}\n")
}
