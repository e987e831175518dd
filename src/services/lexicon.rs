use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Emotion categories recognised in a query, in lexicon declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Stress,
    Energy,
    Mood,
    Physical,
    Comfort,
}

impl EmotionCategory {
    pub const ALL: [EmotionCategory; 5] = [
        EmotionCategory::Stress,
        EmotionCategory::Energy,
        EmotionCategory::Mood,
        EmotionCategory::Physical,
        EmotionCategory::Comfort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Stress => "stress",
            EmotionCategory::Energy => "energy",
            EmotionCategory::Mood => "mood",
            EmotionCategory::Physical => "physical",
            EmotionCategory::Comfort => "comfort",
        }
    }

    /// Lower-case phrases whose presence in a query signals this category.
    pub fn triggers(&self) -> &'static [&'static str] {
        EMOTION_TRIGGERS
            .get(self)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mood labels keyed into the mood-food table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Stressed,
    Energetic,
    Sad,
    Happy,
    Tired,
    Anxious,
    Jumpy,
    Romantic,
    Nostalgic,
}

impl Mood {
    /// Food descriptors associated with this mood.
    pub fn foods(&self) -> &'static [&'static str] {
        MOOD_FOODS.get(self).map(Vec::as_slice).unwrap_or(&[])
    }
}

lazy_static! {
    static ref EMOTION_TRIGGERS: HashMap<EmotionCategory, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(EmotionCategory::Stress, vec!["stressed", "overwhelmed", "pressure", "tense", "anxious"]);
        m.insert(EmotionCategory::Energy, vec!["energetic", "pumped", "active", "workout", "gym", "tired", "sleepy"]);
        m.insert(EmotionCategory::Mood, vec!["sad", "down", "depressed", "happy", "excited", "celebration"]);
        m.insert(EmotionCategory::Physical, vec!["jumpy", "restless", "can't sit still", "fidgety", "hyperactive"]);
        m.insert(EmotionCategory::Comfort, vec!["need comfort", "cozy", "warm", "hug", "security"]);
        m
    };

    static ref MOOD_FOODS: HashMap<Mood, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(Mood::Stressed, vec!["comfort food", "warm soup", "chocolate", "tea", "calming herbs"]);
        m.insert(Mood::Energetic, vec!["spicy food", "citrus", "protein rich", "fresh salads", "coffee"]);
        m.insert(Mood::Sad, vec!["comfort food", "sweet treats", "warm dishes", "chocolate", "ice cream"]);
        m.insert(Mood::Happy, vec!["light meals", "fresh ingredients", "colorful dishes", "celebration food"]);
        m.insert(Mood::Tired, vec!["energy boosting", "protein", "caffeine", "nuts", "fruits"]);
        m.insert(Mood::Anxious, vec!["calming foods", "herbal tea", "light meals", "avoiding caffeine"]);
        m.insert(Mood::Jumpy, vec!["calming foods", "magnesium rich", "avoiding stimulants", "herbal remedies"]);
        m.insert(Mood::Romantic, vec!["wine pairing", "elegant dishes", "aphrodisiac foods", "intimate dining"]);
        m.insert(Mood::Nostalgic, vec!["traditional dishes", "childhood favorites", "classic recipes", "comfort food"]);
        m
    };
}
