//! Command to configure a profile interactively.
//!
//! Every answer is optional except the Ops Manager URL. Values already stored, or provided through
//! `MONGODB_ATLAS_*` / `MCLI_*` environment variables, are offered so the command can be rerun to
//! change a single setting.

use std::fmt::Display;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::{
    args,
    commands::{
        CommandWithOutput,
        validators::{ObjectIdValidator, UrlValidator},
    },
    config::{self, DEFAULT_PROFILE, Profile, Property, Value},
    dependencies::{BinaryLocator, MONGOSH_BIN, PathLookup},
    interaction::{
        InputPrompt, InputPromptOptions, InputPromptResult, InputPromptValidator, Interaction,
        SelectPrompt, SelectPromptOptions, SelectPromptResult,
    },
    models::{OUTPUT_FORMATS, Service},
};

// Interaction dependencies for the init command
pub trait InitInteraction: InputPrompt + SelectPrompt + Send {}
impl<T: InputPrompt + SelectPrompt + Send> InitInteraction for T {}

pub struct Init {
    service: Option<Service>,

    profile: Profile,
    interaction: Box<dyn InitInteraction>,
    binaries: Box<dyn BinaryLocator + Send>,
}

impl TryFrom<args::Init> for Init {
    type Error = anyhow::Error;

    fn try_from(args: args::Init) -> Result<Self> {
        Ok(Self {
            service: if args.gov {
                Some(Service::CloudGov)
            } else {
                args.service
            },

            profile: config::load_profile(args.profile.as_deref())
                .context("loading configuration")?,
            interaction: Box::new(Interaction::new()),
            binaries: Box::new(PathLookup::new()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InitResult {
    Configured { profile_name: String },
    Canceled { profile_name: String },
}

impl Display for InitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured { profile_name } => {
                writeln!(f, "Your profile is now configured.")?;
                if profile_name != DEFAULT_PROFILE {
                    writeln!(
                        f,
                        "To use this profile, you must set the flag [-P {profile_name}] for every command."
                    )?;
                }
                write!(
                    f,
                    "You can use [atlas config set] to change these settings at a later time."
                )
            }
            Self::Canceled { .. } => write!(f, "Profile not configured"),
        }
    }
}

/// Answers collected from the prompts, in the order they were asked.
type Answers = Vec<(Property, String)>;

impl Init {
    /// Explicit flag, then what the profile already uses, then Atlas.
    fn service(&self) -> Service {
        self.service
            .or_else(|| {
                self.profile
                    .get(Property::Service)
                    .and_then(|value| value.as_str()?.parse().ok())
            })
            .unwrap_or_default()
    }

    /// Current value of a property, offered as the default answer.
    fn current(&self, property: Property) -> Option<String> {
        self.profile
            .get(property)
            .map(|value| value.to_string())
            .filter(|value| !value.is_empty())
    }

    /// Ask for one property. `None` means the user canceled.
    fn ask(
        &self,
        property: Property,
        message: &str,
        validator: Option<InputPromptValidator>,
    ) -> Result<Option<String>> {
        let options = InputPromptOptions::builder()
            .message(message)
            .default_opt(self.current(property))
            .validator_opt(validator)
            .final_answer(self.profile.env_override(property))
            .secret(property == Property::PrivateApiKey)
            .build();

        Ok(
            match self
                .interaction
                .input(options)
                .with_context(|| format!("prompting for {property}"))?
            {
                InputPromptResult::Input(value) => Some(value.trim().to_string()),
                InputPromptResult::Canceled => None,
            },
        )
    }

    fn prompt_settings(&self, service: Service) -> Result<Option<Answers>> {
        let mut answers = Answers::new();

        let mut questions = vec![
            (Property::PublicApiKey, "Public API Key:", None),
            (Property::PrivateApiKey, "Private API Key:", None),
        ];
        if service.requires_base_url() {
            questions.push((
                Property::OpsManagerUrl,
                "URL to Access Ops Manager:",
                Some(InputPromptValidator::new(UrlValidator)),
            ));
        }
        questions.push((
            Property::OrgId,
            "Default Org ID:",
            Some(InputPromptValidator::new(ObjectIdValidator)),
        ));
        questions.push((
            Property::ProjectId,
            "Default Project ID:",
            Some(InputPromptValidator::new(ObjectIdValidator)),
        ));

        for (property, message, validator) in questions {
            let Some(answer) = self.ask(property, message, validator)? else {
                return Ok(None);
            };
            answers.push((property, answer));
        }

        let current_output = self.current(Property::Output);
        let starting_cursor = OUTPUT_FORMATS
            .iter()
            .position(|format| Some(*format) == current_output.as_deref())
            .unwrap_or_default();

        match self
            .interaction
            .select(
                SelectPromptOptions::builder()
                    .message("Default Output Format:")
                    .options(OUTPUT_FORMATS)
                    .starting_cursor(starting_cursor)
                    .build(),
            )
            .context("prompting for output")?
        {
            SelectPromptResult::Selected(output) => answers.push((Property::Output, output)),
            SelectPromptResult::Canceled => return Ok(None),
        }

        Ok(Some(answers))
    }
}

#[async_trait]
impl CommandWithOutput for Init {
    type Output = InitResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let profile_name = self.profile.name().to_string();
        let service = self.service();

        eprintln!(
            "You are configuring a profile for {service}.\n\n\
             All values are optional and you can use environment variables (MONGODB_ATLAS_*) instead.\n"
        );

        let Some(answers) = self.prompt_settings(service)? else {
            return Ok(InitResult::Canceled { profile_name });
        };

        self.profile.set(Property::Service, Value::from(service.as_str()));
        for (property, answer) in answers {
            if !answer.is_empty() {
                self.profile.set(property, Value::from(answer));
            }
        }

        let mongosh = match self.profile.get(Property::MongoshPath) {
            Some(_) => None,
            None => self.binaries.locate(MONGOSH_BIN),
        };
        if let Some(path) = mongosh {
            debug!(path = %path.display(), "found mongosh");
            self.profile
                .set_global(Property::MongoshPath, Value::from(path.display().to_string()));
        }

        self.profile.save().context("saving configuration")?;

        Ok(InitResult::Configured { profile_name })
    }
}
