use std::collections::HashMap;

use serde::Serialize;

/// Points awarded for each correctly answered question.
pub const POINTS_PER_QUESTION: usize = 20;

#[derive(Serialize)]
pub struct Question {
    pub prompt: &'static str,
    pub choices: [&'static str; 4],
    /// Never rendered: the quiz page must not leak it.
    #[serde(skip)]
    pub answer: &'static str,
}

pub static QUESTIONS: [Question; 5] = [
    Question {
        prompt: "¿Cuál es el objetivo principal del reciclaje PET?",
        choices: [
            "Tirar la basura más rápido",
            "Reducir, reutilizar y reciclar los residuos",
            "Usar más plásticos",
            "Quemar la basura",
        ],
        answer: "Reducir, reutilizar y reciclar los residuos",
    },
    Question {
        prompt: "¿En qué contenedor se debe depositar el plástico?",
        choices: ["Rojo", "Verde", "Azul", "Amarillo"],
        answer: "Amarillo",
    },
    Question {
        prompt: "¿Qué acción ayuda más al reciclaje?",
        choices: [
            "Mezclar toda la basura",
            "Tirar residuos en la calle",
            "Separar los residuos por tipo",
            "Usar más bolsas de plástico",
        ],
        answer: "Separar los residuos por tipo",
    },
    Question {
        prompt: "¿Quiénes deben participar en el PET de reciclaje?",
        choices: [
            "Solo los alumnos",
            "Solo los maestros",
            "Toda la comunidad escolar",
            "Solo los directivos",
        ],
        answer: "Toda la comunidad escolar",
    },
    Question {
        prompt: "¿Qué material se recicla en el PET?",
        choices: ["Vidrio", "Papel", "Plástico", "Metal"],
        answer: "Plástico",
    },
];

/// Name of the form field carrying the answer to the i-th question (0-based).
pub fn field_name(index: usize) -> String {
    format!("question{index}")
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Score {
    pub points: usize,
    pub max_points: usize,
    pub correct: usize,
    pub total: usize,
}

/// Scores a submitted form against a question bank. Answers are compared verbatim; missing fields
/// are wrong answers.
pub fn score(questions: &[Question], submitted: &HashMap<String, String>) -> Score {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| submitted.get(&field_name(*i)).map(String::as_str) == Some(q.answer))
        .count();

    Score {
        points: correct * POINTS_PER_QUESTION,
        max_points: questions.len() * POINTS_PER_QUESTION,
        correct,
        total: questions.len(),
    }
}
