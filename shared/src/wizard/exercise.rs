use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{neighbour, position, AssessmentWizard, WizardError};
use crate::models::{ExerciseAssessmentInput, Split, SplitPreview, MAX_WORKOUT_DAYS, MIN_WORKOUT_DAYS};
use crate::types::{CardioPreference, FitnessLevel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStep {
    Welcome,
    AthleteLevel,
    Cardio,
    WorkoutDays,
    SplitChoice,
    Loading,
    Review,
    Done,
}

impl ExerciseStep {
    pub const ORDER: [ExerciseStep; 8] = [
        ExerciseStep::Welcome,
        ExerciseStep::AthleteLevel,
        ExerciseStep::Cardio,
        ExerciseStep::WorkoutDays,
        ExerciseStep::SplitChoice,
        ExerciseStep::Loading,
        ExerciseStep::Review,
        ExerciseStep::Done,
    ];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseAnswers {
    pub fitness_level: Option<FitnessLevel>,
    pub cardio: Option<CardioPreference>,
    pub workout_days: Option<i32>,
    pub split_id: Option<Uuid>,
}

/// The exercise questionnaire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseWizard {
    step: ExerciseStep,
    splits: Vec<Split>,
    answers: ExerciseAnswers,
    preview: Option<SplitPreview>,
}

impl ExerciseWizard {
    pub fn new(splits: Vec<Split>) -> Self {
        Self {
            step: ExerciseStep::Welcome,
            splits,
            answers: ExerciseAnswers::default(),
            preview: None,
        }
    }

    pub fn answers(&self) -> &ExerciseAnswers {
        &self.answers
    }

    pub fn preview(&self) -> Option<&SplitPreview> {
        self.preview.as_ref()
    }

    /// Splits matching the chosen number of workout days
    pub fn available_splits(&self) -> Vec<&Split> {
        match self.answers.workout_days {
            Some(days) => self.splits.iter().filter(|s| s.workout_days == days).collect(),
            None => Vec::new(),
        }
    }

    pub fn set_fitness_level(&mut self, level: FitnessLevel) -> Result<(), WizardError> {
        self.require_step(ExerciseStep::AthleteLevel, "choosing a fitness level")?;
        self.answers.fitness_level = Some(level);
        Ok(())
    }

    pub fn set_cardio(&mut self, cardio: CardioPreference) -> Result<(), WizardError> {
        self.require_step(ExerciseStep::Cardio, "answering the cardio question")?;
        self.answers.cardio = Some(cardio);
        Ok(())
    }

    /// Choose days per week; a chosen split for a different day count is cleared
    pub fn set_workout_days(&mut self, days: i32) -> Result<(), WizardError> {
        self.require_step(ExerciseStep::WorkoutDays, "choosing workout days")?;
        if !(MIN_WORKOUT_DAYS..=MAX_WORKOUT_DAYS).contains(&days) {
            return Err(WizardError::InvalidAnswer(format!(
                "workout days must be between {} and {}, got {}",
                MIN_WORKOUT_DAYS, MAX_WORKOUT_DAYS, days
            )));
        }
        self.answers.workout_days = Some(days);

        let split_still_fits = self
            .answers
            .split_id
            .is_some_and(|id| self.splits.iter().any(|s| s.id == id && s.workout_days == days));
        if !split_still_fits {
            self.answers.split_id = None;
        }
        Ok(())
    }

    pub fn choose_split(&mut self, split_id: Uuid) -> Result<(), WizardError> {
        self.require_step(ExerciseStep::SplitChoice, "choosing a split")?;
        if !self.available_splits().iter().any(|s| s.id == split_id) {
            return Err(WizardError::UnknownOption(split_id.to_string()));
        }
        if self.answers.split_id != Some(split_id) {
            self.preview = None;
        }
        self.answers.split_id = Some(split_id);
        Ok(())
    }

    /// Hand over the loaded program of the chosen split
    pub fn supply_preview(&mut self, preview: SplitPreview) -> Result<(), WizardError> {
        self.require_step(ExerciseStep::Loading, "supplying the split preview")?;
        if Some(preview.split.id) != self.answers.split_id {
            return Err(WizardError::UnknownOption(preview.split.id.to_string()));
        }
        self.preview = Some(preview);
        Ok(())
    }

    pub fn submission(&self) -> Result<ExerciseAssessmentInput, WizardError> {
        if self.step != ExerciseStep::Done {
            return Err(WizardError::NotReady("the questionnaire to finish"));
        }
        let (Some(fitness_level), Some(workout_days), Some(split_id)) = (
            self.answers.fitness_level,
            self.answers.workout_days,
            self.answers.split_id,
        ) else {
            return Err(WizardError::MissingAnswer("fitness level, workout days and split"));
        };

        Ok(ExerciseAssessmentInput {
            fitness_level,
            cardio_preference: self.answers.cardio,
            workout_days,
            split_id,
            coach_notes: None,
        })
    }

    fn require_step(&self, expected: ExerciseStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: format!("{:?}", self.step),
            })
        }
    }
}

impl AssessmentWizard for ExerciseWizard {
    type Step = ExerciseStep;

    fn step(&self) -> ExerciseStep {
        self.step
    }

    fn next(&mut self) -> Result<ExerciseStep, WizardError> {
        let missing = match self.step {
            ExerciseStep::Done => return Err(WizardError::Finished),
            ExerciseStep::AthleteLevel if self.answers.fitness_level.is_none() => Some("fitness level"),
            ExerciseStep::Cardio if self.answers.cardio.is_none() => Some("cardio preference"),
            ExerciseStep::WorkoutDays if self.answers.workout_days.is_none() => Some("workout days"),
            ExerciseStep::SplitChoice if self.answers.split_id.is_none() => Some("split"),
            ExerciseStep::Loading if self.preview.is_none() => {
                return Err(WizardError::NotReady("the split preview"));
            }
            _ => None,
        };
        if let Some(answer) = missing {
            return Err(WizardError::MissingAnswer(answer));
        }
        if let Some(next) = neighbour(&ExerciseStep::ORDER, self.step, 1) {
            self.step = next;
        }
        Ok(self.step)
    }

    fn back(&mut self) -> ExerciseStep {
        self.step = match self.step {
            // The preview belongs to the split; it is reloaded after a new choice
            ExerciseStep::Loading | ExerciseStep::Review => {
                self.preview = None;
                ExerciseStep::SplitChoice
            }
            step => neighbour(&ExerciseStep::ORDER, step, -1).unwrap_or(step),
        };
        self.step
    }

    fn progress(&self) -> (usize, usize) {
        (position(&ExerciseStep::ORDER, &self.step), ExerciseStep::ORDER.len())
    }

    fn is_done(&self) -> bool {
        self.step == ExerciseStep::Done
    }
}
