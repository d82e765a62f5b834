use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::DeviceClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Japanese];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Language::English => &[
                "en_GB", "en_US", "en_AU", "en_CA", "en_NZ", "en_IE", "en_ZA", "en_IN", "en",
            ],
            Language::Japanese => &["ja_JP", "ja"],
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Japanese => "JA",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Language::English => Language::Japanese,
            Language::Japanese => Language::English,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalizationKey {
    Placeholder,
    PersonalTerminal,
    Folders,
    Biography,
    WorkHistory,
    OldWebsite,
    ScpContainmentBreach,
    ModularPathfinding,
    March22Engine,
    RpyEbook,
    March22Vita,
    Tsthree,
    Github,
    Twitter,
    Linkedin,
    BiographyContents,
    WorkHistoryContents,
    OldWebsiteContents,
    ScpcbContents,
    ModularPathfindingContents,
    March22EngineContents,
    RpyEbookContents,
    March22VitaContents,
    TsthreeContents,
    GithubContents,
    TwitterContents,
    LinkedinContents,
    Personal,
    ProjectsFirst,
    ProjectsSecond,
    Contact,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocaleError {
    #[error("locale {0:?} does not match any supported language")]
    Unrecognized(String),
}

#[derive(Debug, Clone, Default)]
pub struct LocalizationTable {
    strings: HashMap<Language, HashMap<LocalizationKey, String>>,
}

impl LocalizationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: Language, key: LocalizationKey, value: impl Into<String>) {
        self.strings
            .entry(language)
            .or_default()
            .insert(key, value.into());
    }

    pub fn get(&self, language: Language, key: LocalizationKey) -> Option<&str> {
        self.strings
            .get(&language)
            .and_then(|strings| strings.get(&key))
            .map(String::as_str)
    }

    pub fn builtin() -> Arc<LocalizationTable> {
        Arc::clone(&BUILTIN_TABLE)
    }
}

static BUILTIN_TABLE: Lazy<Arc<LocalizationTable>> = Lazy::new(|| {
    let mut table = LocalizationTable::new();
    for (key, value) in ENGLISH {
        table.insert(Language::English, *key, *value);
    }
    for (key, value) in JAPANESE {
        table.insert(Language::Japanese, *key, *value);
    }
    Arc::new(table)
});

const ACTION_PLACEHOLDER: &str = "{action}";

pub struct LanguageContext {
    table: Arc<LocalizationTable>,
    default_language: Language,
    active: RwLock<Language>,
    device: DeviceClass,
}

impl LanguageContext {
    pub fn new(default_language: Language, device: DeviceClass) -> Self {
        Self::with_table(LocalizationTable::builtin(), default_language, device)
    }

    pub fn with_table(
        table: Arc<LocalizationTable>,
        default_language: Language,
        device: DeviceClass,
    ) -> Self {
        Self {
            table,
            default_language,
            active: RwLock::new(default_language),
            device,
        }
    }

    pub fn active_language(&self) -> Language {
        *self.active.read()
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn set_language(&self, locale: &str) -> Result<Language, LocaleError> {
        let wanted = normalize_locale(locale);
        for language in Language::ALL {
            if language
                .aliases()
                .iter()
                .any(|alias| alias.to_ascii_lowercase() == wanted)
            {
                *self.active.write() = language;
                debug!(locale, ?language, "language activated");
                return Ok(language);
            }
        }
        warn!(locale, "failed to set locale");
        Err(LocaleError::Unrecognized(locale.to_owned()))
    }

    pub fn set_active(&self, language: Language) {
        *self.active.write() = language;
    }

    pub fn resolve(&self, key: LocalizationKey) -> String {
        let raw = self
            .table
            .get(self.active_language(), key)
            .or_else(|| self.table.get(self.default_language, key))
            .unwrap_or_default();
        if raw.contains(ACTION_PLACEHOLDER) {
            raw.replace(ACTION_PLACEHOLDER, self.action_verb())
        } else {
            raw.to_owned()
        }
    }

    fn action_verb(&self) -> &'static str {
        if self.device.is_touch() {
            "Tap"
        } else {
            "Click"
        }
    }
}

fn normalize_locale(locale: &str) -> String {
    let tag = locale.trim().split(['.', '@']).next().unwrap_or_default();
    tag.replace('-', "_").to_ascii_lowercase()
}

use LocalizationKey as K;

const ENGLISH: &[(LocalizationKey, &str)] = &[
    (K::Placeholder, "PLACEHOLDER"),
    (K::PersonalTerminal, "PERSONAL TERMINAL"),
    (K::Folders, "FOLDERS"),
    (K::Biography, "BIOGRAPHY"),
    (K::WorkHistory, "WORK HISTORY"),
    (K::OldWebsite, "OLD WEBSITE"),
    (K::ScpContainmentBreach, "SCP: CONTAINMENT BREACH"),
    (K::ModularPathfinding, "MODULAR PATHFINDING"),
    (K::March22Engine, "MARCH22 ENGINE"),
    (K::RpyEbook, "RPY-EBOOK"),
    (K::March22Vita, "MARCH22-VITA"),
    (K::Tsthree, "TSTHREE"),
    (K::Github, "GITHUB"),
    (K::Twitter, "TWITTER"),
    (K::Linkedin, "LINKEDIN"),
    (K::Personal, "PERSONAL"),
    (K::ProjectsFirst, "PROJECTS\n1/2"),
    (K::ProjectsSecond, "PROJECTS\n2/2"),
    (K::Contact, "CONTACT"),
    (
        K::OldWebsiteContents,
        "{action} here to go to the old, less-interesting website.",
    ),
    (
        K::LinkedinContents,
        "{action} here to open my LinkedIn profile in another window.",
    ),
    (
        K::TwitterContents,
        "{action} here to open my Twitter profile in another window.",
    ),
    (
        K::GithubContents,
        "{action} here to open my Github profile in another window.",
    ),
    (
        K::TsthreeContents,
        "A custom entity-component game engine for HTML5 games (it powers this website!), \
designed primarily for ease-of-use when porting Unity projects to HTML5 Instant Games. \
Utilises three-js for three-dimensions, and PIXIv6 for two-dimensions.\n\n\
{action} here to go to the Github page for the project.",
    ),
    (
        K::March22VitaContents,
        "A port of the March22 engine to the PSVita, using lpp-vita (a Lua engine). \
Utilizes Ren'Py (python) game script as source, and compiles into Lua via a C++ algorithm, \
for multi-platform usage.\n\n\
{action} here to go to the Github page for the project.",
    ),
    (
        K::March22EngineContents,
        "An open-source engine/framework for adding interactive narrative to games, or making \
visual novel games. Originally written in C++, the latest version leverages the Unity game \
engine (C#). Closes the gap between author and programmer by utilising a custom-built, \
extensible, lightweight scripting language.\n\n\
{action} here to go to the Github page for the project.",
    ),
    (
        K::ModularPathfindingContents,
        "A library of modular, plug-and-play AI algorithms in C++, currently supporting the \
basic bruteforce algorithms, as well as A* and its variants, in grid-based node maps.\n\n\
The example shown is an implementation of said library, using A* Epsilon for agents and \
Breadth-First for random level generation.\n\n\
{action} here to go to the Github page.",
    ),
    (
        K::BiographyContents,
        "My name is Sam, and I'm a games/software developer with primary experience in \
TypeScript/HTML5, as well as experience in a number of other languages (such as C/C++, C#, \
and Lua). I take great pride in my professional and personal projects; placing a great deal \
of effort into them all. I can speak Japanese, am learning to play guitar, and of course I \
play a lot of games!\n\n\
I graduated from Bournemouth University in 2019 with a first-class w/ honours in Games \
Programming.\n\n\
Currently working for Popcore GmbH in Berlin, Germany as a Principal HTML5 Game Developer, \
porting mobile Unity games to HTML5 platforms such as Facebook Instant.",
    ),
    (
        K::ScpcbContents,
        "SCP: Containment Breach is a free survival horror game based on the SCP Foundation \
works of fiction, played by thousands of people.\n\n\
Originally a modder working on the Box of Horrors mod, it was very well-received, enough to \
be merged into the main game.\n\n\
{action} here to go to the SCP: Containment Breach website.",
    ),
    (
        K::WorkHistoryContents,
        "Popcore GmbH.\nPrincipal HTML5 Game Developer\nOctober 2021 - Present\nBerlin, Germany\n\n\
Softgames GmbH.\nSenior HTML5 Game Developer\nOctober 2020 - September 2021\nBerlin, Germany\n\n\
Softgames GmbH.\nTechnical Project Manager\nApril 2019 - October 2020\nTokyo, Japan / Berlin, Germany\n\n\
Softgames GmbH.\nHTML5 Game Developer\nJune 2018 - April 2019\nBerlin, Germany\n\n\
CoolGames B.V.\nGame Developer Intern\nSeptember 2017 - May 2018\nAmsterdam, Netherlands\n\n\
Bournemouth University\nStudent Research Assistant\nJanuary 2017 - March 2017\nBournemouth, England",
    ),
    (
        K::RpyEbookContents,
        "A small project, RPY-eBook is an algorithm that parses .rpy game script (Ren\u{2019}Py \
visual novel scripts) and output an eBook-friendly file that allows the \"game\" to be read on \
tablet or ebook devices, such as a Kindle.\n\n\
{action} here to go to the Github page for the project.",
    ),
];

// Untranslated keys fall back to English.
const JAPANESE: &[(LocalizationKey, &str)] = &[
    (K::Placeholder, "PLACEHOLDER"),
    (K::Personal, "パーソナル"),
    (K::ProjectsFirst, "プロジェクト\n1/2"),
    (K::ProjectsSecond, "プロジェクト\n2/2"),
    (K::Contact, "お問い合わせ"),
];
