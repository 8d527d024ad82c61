//! Shared helpers for shelf-core integration tests

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use shelf_core::sources::{BookSource, SourceError, SourceMetadata};
use shelf_core::BookRecord;
use std::sync::{Arc, Mutex};

/// What a scripted source answers.
#[derive(Clone)]
pub enum Scripted {
    Found(BookRecord),
    Empty,
    Fail,
}

/// A source that answers from a script and records every ISBN it was asked for.
#[derive(Clone)]
pub struct ScriptedSource {
    pub id: &'static str,
    pub answer: Scripted,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    pub fn new(id: &'static str, answer: Scripted) -> Self {
        Self {
            id,
            answer,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookSource for ScriptedSource {
    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            id: self.id,
            name: self.id,
            description: "scripted",
            base_url: "http://localhost",
            requires_api_key: false,
        }
    }

    async fn lookup(&self, isbn: &str) -> Result<Option<BookRecord>, SourceError> {
        self.calls.lock().unwrap().push(isbn.to_string());
        match &self.answer {
            Scripted::Found(book) => Ok(Some(book.clone())),
            Scripted::Empty => Ok(None),
            Scripted::Fail => Err(SourceError::Status(503)),
        }
    }
}

pub fn sample_book(id: &str, title: &str) -> BookRecord {
    BookRecord::new(id, title)
        .with_authors(Some(vec!["Joshua Bloch".to_string()]))
        .with_isbn(Some("9780134685991".to_string()))
}
