use crate::localization::LocalizationKey as K;
use crate::localization::LocalizationKey;

pub const SECTION_COUNT: usize = 4;
pub const ENTRY_SLOTS: usize = 3;
pub const IMAGE_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub title: LocalizationKey,
    pub body: LocalizationKey,
    pub link: Option<&'static str>,
    pub images: [Option<&'static str>; IMAGE_SLOTS],
}

impl Entry {
    pub const fn text(title: LocalizationKey, body: LocalizationKey) -> Self {
        Self {
            title,
            body,
            link: None,
            images: [None; IMAGE_SLOTS],
        }
    }

    pub const fn linked(
        title: LocalizationKey,
        body: LocalizationKey,
        link: &'static str,
        image: &'static str,
    ) -> Self {
        Self {
            title,
            body,
            link: Some(link),
            images: [Some(image), None, None],
        }
    }

    pub fn image(&self, slot: usize) -> Option<&'static str> {
        self.images
            .get(slot)
            .copied()
            .flatten()
            .filter(|reference| !reference.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub name: LocalizationKey,
    pub icon: &'static str,
    pub entries: [Option<Entry>; ENTRY_SLOTS],
}

impl Section {
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    sections: [Section; SECTION_COUNT],
}

impl Document {
    pub const fn new(sections: [Section; SECTION_COUNT]) -> Self {
        Self { sections }
    }

    pub fn terminal() -> &'static Document {
        &TERMINAL_DOCUMENT
    }

    pub fn sections(&self) -> &[Section; SECTION_COUNT] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn entry(&self, section: usize, entry: usize) -> Option<&Entry> {
        self.section(section).and_then(|s| s.entry(entry))
    }
}

const GITHUB_MARK: &str = "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";
const TWITTER_LOGO: &str = concat!(
    "data:image/png;base64,",
    include_str!("../assets/twitter-logo.b64")
);
const LINKEDIN_LOGO: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/c/ca/LinkedIn_logo_initials.png/640px-LinkedIn_logo_initials.png";

static TERMINAL_DOCUMENT: Document = Document::new([
    Section {
        name: K::Personal,
        icon: "Docs_2",
        entries: [
            Some(Entry::text(K::Biography, K::BiographyContents)),
            Some(Entry::text(K::WorkHistory, K::WorkHistoryContents)),
            Some(Entry::linked(
                K::OldWebsite,
                K::OldWebsiteContents,
                "https://slynch.dev/legacy",
                "assets/sprites/oldsite.PNG",
            )),
        ],
    },
    Section {
        name: K::ProjectsFirst,
        icon: "CPU",
        entries: [
            Some(Entry::linked(
                K::ScpContainmentBreach,
                K::ScpcbContents,
                "https://www.scpcbgame.com/",
                "assets/sprites/scpcb.png",
            )),
            Some(Entry::linked(
                K::ModularPathfinding,
                K::ModularPathfindingContents,
                "https://github.com/Slynchy/ModularPathFinding",
                "assets/sprites/pathfind.png",
            )),
            Some(Entry::linked(
                K::March22Engine,
                K::March22EngineContents,
                "https://github.com/Slynchy/March22-Unity",
                "assets/sprites/march22.jpg",
            )),
        ],
    },
    Section {
        name: K::ProjectsSecond,
        icon: "Laptop",
        entries: [
            Some(Entry::linked(
                K::RpyEbook,
                K::RpyEbookContents,
                "http://slynch.ovh/Blog/index.php/2016/06/01/rpy-ebook/",
                "assets/sprites/rpyebook.jpg",
            )),
            Some(Entry::linked(
                K::March22Vita,
                K::March22VitaContents,
                "https://github.com/Slynchy/March22-Lua",
                "assets/sprites/march22lua.jpg",
            )),
            Some(Entry::linked(
                K::Tsthree,
                K::TsthreeContents,
                "https://github.com/Slynchy/tsthree",
                GITHUB_MARK,
            )),
        ],
    },
    Section {
        name: K::Contact,
        icon: "Docs",
        entries: [
            Some(Entry::linked(
                K::Github,
                K::GithubContents,
                "https://github.com/Slynchy",
                GITHUB_MARK,
            )),
            Some(Entry::linked(
                K::Twitter,
                K::TwitterContents,
                "https://twitter.com/Slynch2203",
                TWITTER_LOGO,
            )),
            Some(Entry::linked(
                K::Linkedin,
                K::LinkedinContents,
                "https://www.linkedin.com/in/sam-lynch/",
                LINKEDIN_LOGO,
            )),
        ],
    },
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_document_has_four_full_sections() {
        let document = Document::terminal();
        for section in document.sections() {
            assert_eq!(section.entry_count(), ENTRY_SLOTS);
        }
        assert!(document.entry(0, 0).is_some());
        assert!(document.entry(3, 2).is_some());
        assert!(document.entry(4, 0).is_none());
        assert!(document.entry(0, 3).is_none());
    }

    #[test]
    fn image_lookup_skips_unset_slots() {
        let entry = Document::terminal().entry(1, 0).unwrap();
        assert_eq!(entry.image(0), Some("assets/sprites/scpcb.png"));
        assert_eq!(entry.image(1), None);
        assert_eq!(entry.image(7), None);

        let text_only = Document::terminal().entry(0, 0).unwrap();
        assert!(text_only.link.is_none());
        assert_eq!(text_only.image(0), None);
    }

    #[test]
    fn shared_image_references_are_identical() {
        let document = Document::terminal();
        let tsthree = document.entry(2, 2).unwrap().image(0);
        let github = document.entry(3, 0).unwrap().image(0);
        assert_eq!(tsthree, github);
        assert!(document
            .entry(3, 1)
            .unwrap()
            .image(0)
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }
}
