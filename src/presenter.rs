//! Plain-text rendering of session output
//!
//! The session core only hands out [`Presentation`]s and views; anything that
//! draws them implements [`Presenter`].

use crate::state_machine::{Presentation, SessionView};
use crate::transport::{AskResponse, Product, ResponseType};
use std::io::{self, Write};

/// Consumer of session output
pub trait Presenter {
    fn present(&mut self, presentation: &Presentation, view: &SessionView) -> io::Result<()>;

    fn cleared(&mut self) -> io::Result<()>;
}

/// Writes results as plain text lines
pub struct TextPresenter<W: Write> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn products(&mut self, products: &[Product]) -> io::Result<()> {
        for product in products {
            writeln!(self.out, "  {}", product_line(product))?;
        }
        Ok(())
    }

    pub fn answer(&mut self, response: &AskResponse) -> io::Result<()> {
        writeln!(self.out, "{}", response.answer)?;
        for citation in &response.citations {
            writeln!(self.out, "  > {citation}")?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, presentation: &Presentation, view: &SessionView) -> io::Result<()> {
        let label = match presentation.response_type {
            ResponseType::Question => "?",
            ResponseType::Results => "*",
            ResponseType::Answer => ">",
        };
        writeln!(self.out, "{label} {}", presentation.message)?;
        self.products(&presentation.products)?;

        if let Some(question) = &presentation.follow_up_question {
            writeln!(self.out, "Let me help you narrow it down: {question}")?;
            writeln!(self.out, "  (type /follow to answer it)")?;
        }

        if view.is_conversation_active {
            writeln!(
                self.out,
                "Conversation active: {} exchanges (/clear to start over)",
                view.ledger.exchanges()
            )?;
        }
        self.out.flush()
    }

    fn cleared(&mut self) -> io::Result<()> {
        writeln!(self.out, "Conversation cleared.")?;
        self.out.flush()
    }
}

fn product_line(product: &Product) -> String {
    let mut line = format!(
        "#{} {} [{}] ${:.2}",
        product.id, product.name, product.category, product.price
    );
    if let Some(skin_type) = product.skin_type.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!(" - for {skin_type} skin"));
    }
    line
}
