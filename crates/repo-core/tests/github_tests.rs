//! Tests for git remote URL parsing

use pretty_assertions::assert_eq;
use repo_core::{Error, owner_repo_from_url, parse_git_url};
use rstest::rstest;

#[rstest]
#[case("git@github.com:acme/demo.git", Some("acme/demo"))]
#[case("git@github.com:acme/demo", Some("acme/demo"))]
#[case("https://github.com/acme/demo.git", Some("acme/demo"))]
#[case("https://github.com/acme/demo", Some("acme/demo"))]
#[case("https://github.com/acme/demo/", Some("acme/demo"))]
#[case("ssh://git@github.com/acme/demo.git", Some("acme/demo"))]
#[case("ssh://git@github.com:22/acme/demo.git", Some("acme/demo"))]
#[case("git@github.example.com:team/tool.git", Some("team/tool"))]
#[case("https://github.corp.io/team/tool", Some("team/tool"))]
#[case("git@gitlab.com:acme/demo.git", None)]
#[case("https://bitbucket.org/acme/demo.git", None)]
#[case("https://gitlab.com/group/subgroup/demo.git", None)]
#[case("https://git.internal/acme/demo.git", None)]
#[case("/srv/git/demo.git", None)]
#[case("file:///srv/git/demo.git", None)]
fn test_owner_repo(#[case] url: &str, #[case] expected: Option<&str>) {
    assert_eq!(owner_repo_from_url(url).unwrap().as_deref(), expected);
}

#[rstest]
#[case("")]
#[case("not a url")]
#[case("github.com/acme/demo")]
#[case("https://github.com/acme")]
#[case("git@github.com:/acme/demo.git")]
#[case("https://github.com/acme/../demo")]
#[case("ftp://github.com/acme/demo.git")]
#[case("relative/path/demo")]
#[case("file://")]
fn test_invalid_urls(#[case] url: &str) {
    assert!(matches!(
        owner_repo_from_url(url),
        Err(Error::InvalidUrl { .. })
    ));
}

#[test]
fn test_parse_keeps_nested_owner() {
    let parsed = parse_git_url("https://gitlab.com/group/subgroup/demo.git").unwrap();
    assert_eq!(parsed.host, "gitlab.com");
    assert_eq!(parsed.owner, "group/subgroup");
    assert_eq!(parsed.name, "demo");
}
