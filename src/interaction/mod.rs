use std::rc::Rc;

use anyhow::Result;
use typed_builder::TypedBuilder;

mod input;

#[derive(Debug, Default, Clone)]
pub struct Interaction;

impl Interaction {
    pub fn new() -> Self {
        Default::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ConfirmationPromptOptions {
    #[builder(setter(transform = |s: impl Into<String>| s.into()))]
    message: String,
    #[builder(default, setter(strip_option))]
    default: Option<bool>,
    #[builder(default, setter(strip_option))]
    help_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPromptResult {
    Yes,
    No,
    Canceled,
}

pub trait ConfirmationPrompt {
    /// Ask a yes/no question. Without a terminal the answer is [`ConfirmationPromptResult::Canceled`].
    fn confirm(&self, options: ConfirmationPromptOptions) -> Result<ConfirmationPromptResult>;
}

#[derive(TypedBuilder)]
pub struct InputPromptOptions {
    #[builder(setter(transform = |s: impl Into<String>| s.into()))]
    pub message: String,
    #[builder(default, setter(strip_option(fallback = default_opt)))]
    pub default: Option<String>,
    #[builder(default, setter(strip_option(fallback = validator_opt)))]
    pub validator: Option<InputPromptValidator>,
    // When this is set, the input prompt will not be prompted for
    // The input will immediately be returned as the final answer as if the user had already provided the input
    #[builder(default)]
    pub final_answer: Option<String>,
    /// Mask the input, for secrets.
    #[builder(default)]
    pub secret: bool,
}

#[derive(Clone)]
// We're using an Rc because the validator needs to be cloneable, this is the most elegant way to do this
pub struct InputPromptValidator(Rc<dyn InputValidator>);

impl InputPromptValidator {
    pub fn new(validator: impl InputValidator + 'static) -> Self {
        Self(Rc::new(validator))
    }
}

pub trait InputValidator {
    fn validate(&self, input: &str) -> Result<InputValidatorResult>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValidatorResult {
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPromptResult {
    Input(String),
    Canceled,
}

pub trait InputPrompt {
    fn input(&self, options: InputPromptOptions) -> Result<InputPromptResult>;
}

#[derive(Debug, PartialEq, Eq, TypedBuilder)]
pub struct SelectPromptOptions {
    #[builder(setter(transform = |s: impl Into<String>| s.into()))]
    message: String,
    #[builder(setter(transform = |items: impl IntoIterator<Item = impl Into<String>>| {
        items.into_iter().map(|s| s.into()).collect()
    }))]
    options: Vec<String>,
    #[builder(default)]
    starting_cursor: usize,
}

impl SelectPromptOptions {
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectPromptResult {
    Selected(String),
    Canceled,
}

pub trait SelectPrompt {
    fn select(&self, options: SelectPromptOptions) -> Result<SelectPromptResult>;
}
