use papersmith_core::{Difficulty, LlmRequest, Message, QuestionKind, ResponseFormat};

pub const SYSTEM_MESSAGE: &str =
    "You are an expert educational question generator. Always output valid JSON only.";
pub const TEMPERATURE: f32 = 0.7;

/// Inputs shared by the four sub-generations of one job.
#[derive(Clone, Debug)]
pub struct PromptContext {
    pub subject_name: String,
    pub units: Vec<u32>,
    pub difficulty: Difficulty,
    pub context: String,
    pub custom_instructions: Option<String>,
}

pub fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Focus on fundamental concepts, definitions, and basic understanding. \
             Questions should be straightforward and test recall."
        }
        Difficulty::Medium => {
            "Include a mix of conceptual understanding and application. Some questions \
             should require critical thinking while others test foundational knowledge."
        }
        Difficulty::Hard => {
            "Focus on complex problem-solving, analysis, and synthesis. Questions should \
             test deep understanding and the ability to apply concepts in novel scenarios."
        }
    }
}

pub fn max_tokens(kind: QuestionKind) -> u32 {
    match kind {
        QuestionKind::MultipleChoice => 4000,
        QuestionKind::FillBlank => 2000,
        QuestionKind::Short | QuestionKind::Long => 3000,
    }
}

pub fn build_system_prompt(prompt: &PromptContext) -> String {
    let units = prompt
        .units
        .iter()
        .map(|unit| format!("Unit {unit}"))
        .collect::<Vec<_>>()
        .join(", ");
    let example_unit = prompt.units.first().copied().unwrap_or(1);

    let mut text = String::from(
        "You are an expert question paper generator for educational institutions. \
         Your task is to create high-quality, relevant examination questions.\n\n",
    );
    text.push_str(&format!("SUBJECT: {}\n", prompt.subject_name));
    text.push_str(&format!("UNITS: {units}\n"));
    text.push_str(&format!(
        "DIFFICULTY: {}\n\n",
        prompt.difficulty.as_str().to_uppercase()
    ));
    text.push_str(&format!(
        "Difficulty Guidelines: {}\n\n",
        difficulty_guidance(prompt.difficulty)
    ));
    if !prompt.context.is_empty() {
        text.push_str(&format!("REFERENCE CONTENT: {}\n\n", prompt.context));
    }
    if let Some(instructions) = prompt
        .custom_instructions
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        text.push_str(&format!("ADDITIONAL INSTRUCTIONS: {instructions}\n\n"));
    }
    text.push_str(REQUIREMENTS);
    text.push_str("\n\nReturn ONLY a valid JSON object with this exact structure:\n");
    text.push_str(&json_shape(example_unit));
    text
}

const REQUIREMENTS: &str = "IMPORTANT REQUIREMENTS:
1. All questions MUST be based on the provided reference content above
2. Questions should test understanding, not just recall (unless difficulty is \"easy\")
3. Ensure questions are clear, unambiguous, and academically appropriate
4. Distribute questions proportionally across the selected units
5. Avoid creating repetitive or similar questions
6. Output MUST be valid JSON only, no markdown formatting
7. For MCQs: provide 4 distinct options (a, b, c, d) with only one correct answer
8. For fill-in-the-blanks: use exactly one blank (___) per question
9. For short answers: provide 3-5 key points expected in the answer
10. For long answers: provide 6-10 key points expected in the answer";

fn json_shape(unit: u32) -> String {
    format!(
        r#"{{
    "mcqs": [
        {{
            "question": "question text here",
            "options": ["option a", "option b", "option c", "option d"],
            "correct_answer": "the correct option text",
            "explanation": "brief explanation of why this is correct",
            "unit": {unit}
        }}
    ],
    "fill_blanks": [
        {{
            "question": "The ___ is a key concept in...",
            "answer": "answer text",
            "unit": {unit}
        }}
    ],
    "short": [
        {{
            "question": "Explain the concept of...",
            "expected_points": ["point 1", "point 2", "point 3"],
            "marks": 3,
            "unit": {unit}
        }}
    ],
    "long": [
        {{
            "question": "Discuss in detail the...",
            "expected_points": ["point 1", "point 2", "point 3", "point 4", "point 5"],
            "marks": 10,
            "unit": {unit}
        }}
    ]
}}"#
    )
}

pub fn kind_instruction(kind: QuestionKind, count: u32) -> String {
    match kind {
        QuestionKind::MultipleChoice => format!(
            "Generate exactly {count} multiple choice questions in the 'mcqs' array. \
             Other arrays should be empty."
        ),
        QuestionKind::FillBlank => format!(
            "Generate exactly {count} fill in the blank questions in the 'fill_blanks' array. \
             Other arrays should be empty."
        ),
        QuestionKind::Short => format!(
            "Generate exactly {count} short answer questions in the 'short' array. Each \
             should have 3-5 marks and 3-5 expected points. Other arrays should be empty."
        ),
        QuestionKind::Long => format!(
            "Generate exactly {count} long answer questions in the 'long' array. Each \
             should have 10 marks and 6-10 expected points. Other arrays should be empty."
        ),
    }
}

/// Completion request for `count` questions of `kind`. An empty `model`
/// selects the client's default.
pub fn completion_request(
    kind: QuestionKind,
    prompt: &PromptContext,
    count: u32,
    model: &str,
) -> LlmRequest {
    let user = format!(
        "{}\n\n{}",
        build_system_prompt(prompt),
        kind_instruction(kind, count)
    );
    LlmRequest {
        model: model.to_string(),
        messages: vec![Message::system(SYSTEM_MESSAGE), Message::user(user)],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(max_tokens(kind)),
        response_format: Some(ResponseFormat::JsonObject),
    }
}
