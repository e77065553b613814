//! Interactive answering flow

pub mod answer;

pub use answer::AnswerEngine;
