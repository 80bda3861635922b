//! The access policy as pure decisions.
//!
//! Every inbound request is matched against an ordered list of checks and the
//! first match wins:
//!
//! 1. sign-out in remote mode clears the share cookies
//! 2. admin paths in remote mode go to the grid
//! 3. `/admin` goes to `/admin/photos`
//! 4. `/og` goes to `/og/sample`
//! 5. `/photos/<id>` and `/t/<tag>` are rewritten to their canonical prefixes;
//!    in remote mode the rewritten request is also forwarded as in step 7
//! 6. `/share/<key>` validates the key and issues credentials
//! 7. remote mode forwards cookie credentials as request headers, falling
//!    back to the default share key when no share cookie is set
//! 8. everything else is delegated to the session layer
//!
//! Steps 6 and 7 need a share lookup, so [`AccessPolicy::decide`] hands those
//! back to the caller, which performs the lookup and asks the policy again via
//! [`AccessPolicy::activation`] or [`AccessPolicy::forward`].

use chrono::{DateTime, Utc};
use cookie::Cookie;

use crate::config::{BackendMode, Config};
use crate::constants::{
    PATH_ADMIN, PATH_ADMIN_PHOTOS, PATH_GRID, PATH_OG, PATH_OG_SAMPLE, PATH_ROOT,
    PATH_SIGN_OUT, PATH_UNAUTHORIZED, PREFIX_LEGACY_PHOTO, PREFIX_LEGACY_TAG, PREFIX_PHOTO,
    PREFIX_SHARE, PREFIX_TAG, REASON_EXPIRED, REASON_VALIDATION_FAILED,
};
use crate::error::ValidationError;
use crate::share::codec::{cookie_max_age, issue_cookies, removal_cookies, ShareCredentials};
use crate::share::ShareContext;

/// What the adapter must do with the request.
#[derive(Debug, Clone)]
pub enum Action {
    /// Answer with a redirect. `share_headers` are set on the response itself.
    Redirect {
        location: String,
        set_cookies: Vec<Cookie<'static>>,
        share_headers: Option<ShareCredentials>,
    },
    /// Serve `path` instead; the browser-visible URL stays the same.
    Rewrite { path: String },
    /// Continue with the share headers overwritten by `credentials`, serving
    /// `rewrite` instead of the requested path when set.
    Forward {
        rewrite: Option<String>,
        credentials: ShareCredentials,
        set_cookies: Vec<Cookie<'static>>,
    },
    /// Hand the request to the session layer unchanged.
    Delegate,
}

impl Action {
    fn redirect(location: impl Into<String>) -> Self {
        Action::Redirect {
            location: location.into(),
            set_cookies: Vec::new(),
            share_headers: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Decision<'a> {
    Act(Action),
    /// Step 6: validate this key, then call [`AccessPolicy::activation`].
    ActivateShare(&'a str),
    /// Step 7: read the share cookies, then call [`AccessPolicy::forward`].
    ForwardCookies { rewrite: Option<String> },
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub mode: BackendMode,
    pub secure_cookies: bool,
    pub default_ttl_hours: i64,
    pub revalidate_on_request: bool,
    pub default_share_key: String,
}

impl AccessPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.backend.mode,
            secure_cookies: config.server.is_production(),
            default_ttl_hours: config.share.default_ttl_hours,
            revalidate_on_request: config.share.revalidate_on_request,
            default_share_key: config.share.default_share_key.clone(),
        }
    }

    pub fn decide<'a>(&self, path: &'a str) -> Decision<'a> {
        let remote = self.mode.is_remote();

        if remote && is_under(path, PATH_SIGN_OUT) {
            return Decision::Act(Action::Redirect {
                location: PATH_ROOT.to_string(),
                set_cookies: removal_cookies(self.secure_cookies),
                share_headers: None,
            });
        }

        if remote && is_under(path, PATH_ADMIN) {
            return Decision::Act(Action::redirect(PATH_GRID));
        }

        if path == PATH_ADMIN {
            return Decision::Act(Action::redirect(PATH_ADMIN_PHOTOS));
        }

        if path == PATH_OG {
            return Decision::Act(Action::redirect(PATH_OG_SAMPLE));
        }

        let legacy = remainder(path, PREFIX_LEGACY_PHOTO)
            .map(|id| format!("{}/{}", PREFIX_PHOTO, id))
            .or_else(|| {
                remainder(path, PREFIX_LEGACY_TAG).map(|tag| format!("{}/{}", PREFIX_TAG, tag))
            });
        if let Some(rewrite) = legacy {
            return if remote {
                Decision::ForwardCookies {
                    rewrite: Some(rewrite),
                }
            } else {
                Decision::Act(Action::Rewrite { path: rewrite })
            };
        }

        if let Some(key) = remainder(path, PREFIX_SHARE).filter(|key| !key.contains('/')) {
            return Decision::ActivateShare(key);
        }

        if remote {
            return Decision::ForwardCookies { rewrite: None };
        }

        Decision::Act(Action::Delegate)
    }

    /// Outcome of visiting `/share/<key>`.
    pub fn activation(
        &self,
        share_key: &str,
        outcome: Result<Option<ShareContext>, ValidationError>,
        now: DateTime<Utc>,
    ) -> Action {
        let ctx = match outcome {
            Err(_) => return Action::redirect(unauthorized_location(Some(REASON_VALIDATION_FAILED))),
            Ok(None) => return Action::redirect(unauthorized_location(None)),
            Ok(Some(ctx)) => ctx,
        };

        if ctx.is_expired_at(now) {
            return Action::redirect(unauthorized_location(Some(REASON_EXPIRED)));
        }

        let credentials = ShareCredentials {
            share_key: share_key.to_string(),
            album_id: ctx.album_id.clone(),
            allow_download: Some(ctx.allow_download),
        };
        let max_age = cookie_max_age(ctx.expires_at, now, self.default_ttl_hours);

        Action::Redirect {
            location: PATH_ROOT.to_string(),
            set_cookies: issue_cookies(&credentials, max_age, self.secure_cookies),
            share_headers: Some(credentials),
        }
    }

    /// The key step 7 forwards for these cookies: the cookie key, or the
    /// default share key when the cookie has none.
    pub fn claimed_key<'a>(&'a self, cookies: &'a ShareCredentials) -> &'a str {
        if cookies.share_key.is_empty() {
            &self.default_share_key
        } else {
            &cookies.share_key
        }
    }

    /// Step 7. `recheck` is `None` when no lookup was made (revalidation off
    /// or no claimed key), otherwise the result of validating
    /// [`AccessPolicy::claimed_key`]. Share cookies are only expired when
    /// they carried the rejected key.
    pub fn forward(
        &self,
        rewrite: Option<String>,
        cookies: ShareCredentials,
        recheck: Option<Result<Option<ShareContext>, ValidationError>>,
        now: DateTime<Utc>,
    ) -> Action {
        let from_cookie = !cookies.share_key.is_empty();
        let claimed = if from_cookie {
            cookies
        } else {
            ShareCredentials {
                share_key: self.default_share_key.clone(),
                ..Default::default()
            }
        };

        let (credentials, set_cookies) = match recheck {
            None | Some(Err(_)) => (claimed, Vec::new()),
            Some(Ok(Some(ctx))) if !ctx.is_expired_at(now) => {
                (ShareCredentials::from(&ctx), Vec::new())
            }
            Some(Ok(_)) if from_cookie => (
                ShareCredentials::default(),
                removal_cookies(self.secure_cookies),
            ),
            Some(Ok(_)) => (ShareCredentials::default(), Vec::new()),
        };

        Action::Forward {
            rewrite,
            credentials,
            set_cookies,
        }
    }
}

/// `path` is `prefix` itself or lies below it on a segment boundary.
pub fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Non-empty text after `<prefix>/`.
fn remainder<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
}

pub fn unauthorized_location(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!(
            "{}?reason={}",
            PATH_UNAUTHORIZED,
            urlencoding::encode(reason)
        ),
        None => PATH_UNAUTHORIZED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SHARE_ALBUM_ID_COOKIE, SHARE_KEY_COOKIE};
    use crate::error::BackendError;
    use chrono::Duration;

    fn policy(mode: BackendMode) -> AccessPolicy {
        AccessPolicy {
            mode,
            secure_cookies: false,
            default_ttl_hours: 240,
            revalidate_on_request: true,
            default_share_key: String::new(),
        }
    }

    fn forwarded(action: Action) -> (Option<String>, ShareCredentials, Vec<Cookie<'static>>) {
        match action {
            Action::Forward {
                rewrite,
                credentials,
                set_cookies,
            } => (rewrite, credentials, set_cookies),
            other => panic!("expected forward, got {:?}", other),
        }
    }

    fn share(expires_at: Option<DateTime<Utc>>) -> ShareContext {
        ShareContext {
            share_key: "k".to_string(),
            album_id: "album-1".to_string(),
            allow_download: false,
            expires_at,
        }
    }

    fn location(action: &Action) -> &str {
        match action {
            Action::Redirect { location, .. } => location,
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    fn act(decision: Decision<'_>) -> Action {
        match decision {
            Decision::Act(action) => action,
            other => panic!("expected an action, got {:?}", other),
        }
    }

    #[test]
    fn test_sign_out_in_remote_mode_clears_cookies() {
        let action = act(policy(BackendMode::Remote).decide("/sign-out"));
        match action {
            Action::Redirect {
                location,
                set_cookies,
                share_headers,
            } => {
                assert_eq!(location, "/");
                assert!(share_headers.is_none());
                let names: Vec<_> = set_cookies.iter().map(|c| c.name().to_string()).collect();
                assert!(names.contains(&SHARE_KEY_COOKIE.to_string()));
                assert!(names.contains(&SHARE_ALBUM_ID_COOKIE.to_string()));
                assert!(set_cookies.iter().all(|c| c.value().is_empty()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sign_out_in_catalog_mode_is_delegated() {
        let action = act(policy(BackendMode::Catalog).decide("/sign-out"));
        assert!(matches!(action, Action::Delegate));
    }

    #[test]
    fn test_admin_suppressed_in_remote_mode() {
        let remote = policy(BackendMode::Remote);
        for path in ["/admin", "/admin/photos", "/admin/anything/deep"] {
            assert_eq!(location(&act(remote.decide(path))), "/grid");
        }
    }

    #[test]
    fn test_admin_prefix_needs_segment_boundary() {
        let remote = policy(BackendMode::Remote);
        assert!(matches!(
            remote.decide("/administrator"),
            Decision::ForwardCookies { rewrite: None }
        ));
    }

    #[test]
    fn test_canonical_redirects() {
        let catalog = policy(BackendMode::Catalog);
        assert_eq!(location(&act(catalog.decide("/admin"))), "/admin/photos");
        assert_eq!(location(&act(catalog.decide("/og"))), "/og/sample");
        assert!(matches!(act(catalog.decide("/admin/photos")), Action::Delegate));
    }

    #[test]
    fn test_legacy_rewrites() {
        let catalog = policy(BackendMode::Catalog);
        match act(catalog.decide("/photos/abc123")) {
            Action::Rewrite { path } => assert_eq!(path, "/p/abc123"),
            other => panic!("unexpected {:?}", other),
        }
        match act(catalog.decide("/t/nature")) {
            Action::Rewrite { path } => assert_eq!(path, "/tag/nature"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(act(catalog.decide("/photos/")), Action::Delegate));
        assert!(matches!(act(catalog.decide("/tags")), Action::Delegate));
    }

    #[test]
    fn test_legacy_paths_forward_in_remote_mode() {
        let remote = policy(BackendMode::Remote);
        match remote.decide("/photos/abc123") {
            Decision::ForwardCookies { rewrite } => {
                assert_eq!(rewrite.as_deref(), Some("/p/abc123"))
            }
            other => panic!("unexpected {:?}", other),
        }
        match remote.decide("/t/nature") {
            Decision::ForwardCookies { rewrite } => {
                assert_eq!(rewrite.as_deref(), Some("/tag/nature"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_share_path_matching() {
        let catalog = policy(BackendMode::Catalog);
        assert!(matches!(catalog.decide("/share/abc"), Decision::ActivateShare("abc")));
        assert!(matches!(act(catalog.decide("/share/abc/more")), Action::Delegate));
        assert!(matches!(act(catalog.decide("/share/")), Action::Delegate));
        assert!(matches!(act(catalog.decide("/share")), Action::Delegate));
    }

    #[test]
    fn test_remote_mode_forwards_everything_else() {
        let remote = policy(BackendMode::Remote);
        assert!(matches!(
            remote.decide("/"),
            Decision::ForwardCookies { rewrite: None }
        ));
        assert!(matches!(
            remote.decide("/p/xyz"),
            Decision::ForwardCookies { rewrite: None }
        ));
        assert!(matches!(
            act(policy(BackendMode::Catalog).decide("/")),
            Action::Delegate
        ));
    }

    #[test]
    fn test_activation_validation_error_carries_reason() {
        let action = policy(BackendMode::Remote).activation(
            "k",
            Err(ValidationError(BackendError::Transport("down".to_string()))),
            Utc::now(),
        );
        assert_eq!(
            location(&action),
            "/unauthorized?reason=Failed%20to%20validate%20share%20key"
        );
    }

    #[test]
    fn test_activation_not_found_has_no_reason() {
        let action = policy(BackendMode::Remote).activation("k", Ok(None), Utc::now());
        assert_eq!(location(&action), "/unauthorized");
    }

    #[test]
    fn test_activation_expired_one_second_ago() {
        let now = Utc::now();
        let action = policy(BackendMode::Remote).activation(
            "k",
            Ok(Some(share(Some(now - Duration::seconds(1))))),
            now,
        );
        assert_eq!(location(&action), "/unauthorized?reason=expired");
    }

    #[test]
    fn test_activation_expiring_in_one_second() {
        let now = Utc::now();
        let action = policy(BackendMode::Remote).activation(
            "k",
            Ok(Some(share(Some(now + Duration::seconds(1))))),
            now,
        );

        match action {
            Action::Redirect {
                location,
                set_cookies,
                share_headers,
            } => {
                assert_eq!(location, "/");
                assert!(set_cookies
                    .iter()
                    .all(|c| c.max_age() == Some(time::Duration::seconds(1))));
                let headers = share_headers.unwrap();
                assert_eq!(headers.share_key, "k");
                assert_eq!(headers.album_id, "album-1");
                assert_eq!(headers.allow_download, Some(false));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_activation_without_expiry_uses_default_ttl() {
        let action = policy(BackendMode::Catalog).activation("k", Ok(Some(share(None))), Utc::now());
        match action {
            Action::Redirect { set_cookies, .. } => {
                assert_eq!(set_cookies[0].max_age(), Some(time::Duration::hours(240)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_forward_without_recheck_copies_cookies() {
        let cookies = ShareCredentials {
            share_key: "k".to_string(),
            album_id: String::new(),
            allow_download: None,
        };
        let (rewrite, credentials, set_cookies) =
            forwarded(policy(BackendMode::Remote).forward(None, cookies.clone(), None, Utc::now()));
        assert!(rewrite.is_none());
        assert_eq!(credentials, cookies);
        assert!(set_cookies.is_empty());
    }

    #[test]
    fn test_forward_recheck_uses_validated_record() {
        let cookies = ShareCredentials {
            share_key: "k".to_string(),
            album_id: "forged".to_string(),
            allow_download: Some(true),
        };
        let now = Utc::now();
        let (_, credentials, _) = forwarded(policy(BackendMode::Remote).forward(
            None,
            cookies,
            Some(Ok(Some(share(None)))),
            now,
        ));
        assert_eq!(credentials.album_id, "album-1");
        assert_eq!(credentials.allow_download, Some(false));
    }

    #[test]
    fn test_forward_recheck_drops_expired_share() {
        let cookies = ShareCredentials {
            share_key: "k".to_string(),
            album_id: "album-1".to_string(),
            allow_download: None,
        };
        let now = Utc::now();
        let expired = share(Some(now - Duration::seconds(5)));
        let (_, credentials, set_cookies) = forwarded(policy(BackendMode::Remote).forward(
            Some("/p/a1".to_string()),
            cookies,
            Some(Ok(Some(expired))),
            now,
        ));
        assert_eq!(credentials, ShareCredentials::default());
        assert_eq!(set_cookies.len(), 3);
    }

    #[test]
    fn test_forward_recheck_error_keeps_cookie_values() {
        let cookies = ShareCredentials {
            share_key: "k".to_string(),
            album_id: "album-1".to_string(),
            allow_download: None,
        };
        let recheck = Some(Err(ValidationError(BackendError::Status(503))));
        let (_, credentials, _) =
            forwarded(policy(BackendMode::Remote).forward(None, cookies.clone(), recheck, Utc::now()));
        assert_eq!(credentials, cookies);
    }

    #[test]
    fn test_forward_claims_default_key_without_cookie() {
        let mut remote = policy(BackendMode::Remote);
        remote.default_share_key = "public".to_string();
        let cookies = ShareCredentials::default();
        assert_eq!(remote.claimed_key(&cookies), "public");

        let (_, credentials, _) = forwarded(remote.forward(None, cookies, None, Utc::now()));
        assert_eq!(credentials.share_key, "public");
        assert_eq!(credentials.album_id, "");
        assert_eq!(credentials.allow_download, None);
    }

    #[test]
    fn test_forward_cookie_key_wins_over_default() {
        let mut remote = policy(BackendMode::Remote);
        remote.default_share_key = "public".to_string();
        let cookies = ShareCredentials {
            share_key: "k".to_string(),
            ..Default::default()
        };
        assert_eq!(remote.claimed_key(&cookies), "k");
    }

    #[test]
    fn test_forward_rejected_default_key_sets_no_cookies() {
        let mut remote = policy(BackendMode::Remote);
        remote.default_share_key = "gone".to_string();
        let (_, credentials, set_cookies) = forwarded(remote.forward(
            None,
            ShareCredentials::default(),
            Some(Ok(None)),
            Utc::now(),
        ));
        assert_eq!(credentials, ShareCredentials::default());
        assert!(set_cookies.is_empty());
    }
}
