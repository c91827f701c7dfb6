// Profile header: one-shot rendering of account metadata
use gitfolio_api::StarredCount;

use crate::models::Account;

const NO_BIO: &str = "No bio available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Followers,
    Following,
    Repositories,
    Starred,
}

impl StatKind {
    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Followers => "Followers",
            StatKind::Following => "Following",
            StatKind::Repositories => "Repositories",
            StatKind::Starred => "Starred",
        }
    }

    fn tab(&self) -> &'static str {
        match self {
            StatKind::Followers => "followers",
            StatKind::Following => "following",
            StatKind::Repositories => "repositories",
            StatKind::Starred => "stars",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStat {
    pub kind: StatKind,
    pub value: String,
    pub url: String,
}

impl ProfileStat {
    /// "12 Followers"
    pub fn text(&self) -> String {
        format!("{} {}", self.value, self.kind.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub display_name: String,
    /// Terminal title, e.g. "GitHub | OCTOCAT"
    pub title: String,
    pub login: String,
    pub bio: String,
    pub avatar_url: String,
    pub profile_url: String,
    pub stats: Vec<ProfileStat>,
}

impl ProfileCard {
    pub fn from_account(account: &Account, starred: StarredCount) -> Self {
        let display_name = account.display_name().to_string();
        let stat = |kind: StatKind, value: String| ProfileStat {
            kind,
            value,
            url: format!("https://github.com/{}?tab={}", account.login, kind.tab()),
        };

        Self {
            title: format!("GitHub | {}", display_name.to_uppercase()),
            display_name,
            login: format!("@{}", account.login),
            bio: account
                .bio
                .clone()
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| NO_BIO.to_string()),
            avatar_url: account.avatar_url.clone(),
            profile_url: account.profile_url.clone(),
            stats: vec![
                stat(StatKind::Followers, account.followers.to_string()),
                stat(StatKind::Following, account.following.to_string()),
                stat(StatKind::Repositories, account.public_repos.to_string()),
                stat(StatKind::Starred, starred.to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            login: "anxety-solo".into(),
            name: None,
            avatar_url: "https://avatars.example/u/1".into(),
            profile_url: "https://github.com/anxety-solo".into(),
            bio: None,
            followers: 12,
            following: 3,
            public_repos: 30,
        }
    }

    #[test]
    fn test_fallbacks() {
        let card = ProfileCard::from_account(&account(), StarredCount::Unavailable);
        assert_eq!(card.display_name, "anxety-solo");
        assert_eq!(card.title, "GitHub | ANXETY-SOLO");
        assert_eq!(card.login, "@anxety-solo");
        assert_eq!(card.bio, "No bio available");
        assert_eq!(card.stats[3].text(), "N/A Starred");
    }

    #[test]
    fn test_stats_link_to_tabs() {
        let card = ProfileCard::from_account(&account(), StarredCount::Count(107));
        let urls: Vec<_> = card.stats.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://github.com/anxety-solo?tab=followers",
                "https://github.com/anxety-solo?tab=following",
                "https://github.com/anxety-solo?tab=repositories",
                "https://github.com/anxety-solo?tab=stars",
            ]
        );
        assert_eq!(card.stats[0].text(), "12 Followers");
        assert_eq!(card.stats[3].text(), "107 Starred");
    }
}
