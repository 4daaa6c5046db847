// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Story fixtures and caller identities.

use lectern_core::types::{
    Identity, NewExercise, NewQuestion, NewStory, PostReadingQuestion, PreReadingExercise, Role,
    SessionKey, Story, StoryStatus, UserId,
};

/// A student identity with a session key derived from the name.
pub fn student(name: &str) -> Identity {
    Identity {
        user: UserId(name.to_string()),
        role: Role::Student,
        session: SessionKey(format!("{name}-session")),
    }
}

pub fn teacher(name: &str) -> Identity {
    Identity {
        user: UserId(name.to_string()),
        role: Role::Teacher,
        session: SessionKey(format!("{name}-session")),
    }
}

/// Builder for a story with its pre-reading and post-reading content.
#[derive(Debug, Clone)]
pub struct StoryFixture {
    pub(crate) story: NewStory,
    pub(crate) exercises: Vec<NewExercise>,
    pub(crate) questions: Vec<NewQuestion>,
}

impl StoryFixture {
    /// A published story by `ms-lee` with no exercises or questions.
    pub fn new(title: &str) -> Self {
        Self {
            story: NewStory {
                title: title.to_string(),
                description: format!("{title}, a short story"),
                content: format!("{title}. The moon rose slowly over the quiet hill."),
                author: UserId("ms-lee".to_string()),
                status: StoryStatus::Published,
            },
            exercises: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// "Moonlight": exercise Q1 (correct A) and Q2 (correct D), plus
    /// `questions` post-reading questions whose correct designators cycle
    /// through 2, 1, 4, 3.
    pub fn moonlight(questions: usize) -> Self {
        let mut fixture = Self::new("Moonlight")
            .exercise("Q1", "A", "B", 1)
            .exercise("Q2", "C", "D", 2);
        for i in 0..questions {
            let correct = [2, 1, 4, 3][i % 4];
            fixture = fixture.question(&format!("P{}", i + 1), correct);
        }
        fixture
    }

    pub fn author(mut self, author: &str) -> Self {
        self.story.author = UserId(author.to_string());
        self
    }

    pub fn draft(mut self) -> Self {
        self.story.status = StoryStatus::Draft;
        self
    }

    /// Two-option exercise; `correct` is 1 or 2 (anything else flags none).
    pub fn exercise(mut self, text: &str, option_1: &str, option_2: &str, correct: u8) -> Self {
        self.exercises.push(NewExercise {
            question_text: text.to_string(),
            option_1: option_1.to_string(),
            option_2: option_2.to_string(),
            is_option_1_correct: correct == 1,
            is_option_2_correct: correct == 2,
        });
        self
    }

    /// Four-option question with options `opt1`..`opt4`.
    pub fn question(mut self, text: &str, correct_option: u8) -> Self {
        self.questions.push(NewQuestion {
            question_text: text.to_string(),
            option_1: "opt1".to_string(),
            option_2: "opt2".to_string(),
            option_3: "opt3".to_string(),
            option_4: "opt4".to_string(),
            correct_option,
            explanation: format!("{text}: option {correct_option} is supported by the text."),
        });
        self
    }
}

/// A story as stored, with its content in traversal order.
#[derive(Debug, Clone)]
pub struct SeededStory {
    pub story: Story,
    pub exercises: Vec<PreReadingExercise>,
    pub questions: Vec<PostReadingQuestion>,
}
