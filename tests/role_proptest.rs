//! Property tests for the role model, the authorization rule, token
//! lifetimes and tag parsing

use assert_matches::assert_matches;
use proptest::prelude::*;
use uuid::Uuid;

use imagehub::backend::auth::policy::authorize;
use imagehub::backend::auth::{Identity, TokenService, TokenType};
use imagehub::backend::error::BackendError;
use imagehub::shared::config::AuthConfig;
use imagehub::shared::photo::{parse_tags, MAX_TAGS_PER_PHOTO};
use imagehub::shared::Role;

fn role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn token_type() -> impl Strategy<Value = TokenType> {
    prop::sample::select(vec![
        TokenType::Access,
        TokenType::Refresh,
        TokenType::EmailConfirmation,
        TokenType::PasswordReset,
    ])
}

fn uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn service() -> TokenService {
    let config = AuthConfig {
        jwt_secret: "property-secret".to_string(),
        bcrypt_cost: 4,
        ..AuthConfig::default()
    };
    TokenService::new(&config).unwrap()
}

proptest! {
    #[test]
    fn prop_role_order_is_total_and_transitive(a in role(), b in role(), c in role()) {
        prop_assert!(a.satisfies(b) || b.satisfies(a));
        if a.satisfies(b) && b.satisfies(c) {
            prop_assert!(a.satisfies(c));
        }
        prop_assert!(a.satisfies(Role::Regular));
    }

    #[test]
    fn prop_role_string_round_trip(r in role()) {
        prop_assert_eq!(r.as_str().parse::<Role>().unwrap(), r);
        prop_assert_eq!(r.to_string().to_uppercase().parse::<Role>().unwrap(), r);
    }

    #[test]
    fn prop_authorize_matches_rule(
        caller_role in role(),
        required in role(),
        caller in uuid(),
        other in uuid(),
        owned in any::<bool>(),
        has_owner in any::<bool>(),
        allow_override in any::<bool>(),
    ) {
        let owner = if !has_owner {
            None
        } else if owned {
            Some(caller)
        } else {
            Some(other)
        };

        let expected = caller_role >= required
            || (allow_override && owner == Some(caller));
        prop_assert_eq!(
            authorize(caller_role, required, caller, owner, allow_override),
            expected
        );
    }

    #[test]
    fn prop_admin_is_always_allowed(required in role(), caller in uuid(), owner in uuid()) {
        prop_assert!(authorize(Role::Admin, required, caller, Some(owner), false));
    }

    #[test]
    fn prop_token_valid_until_exp(
        user_id in uuid(),
        r in role(),
        tt in token_type(),
        issued in 1_600_000_000i64..1_900_000_000,
        elapsed_fraction in 0.0f64..1.0,
    ) {
        let tokens = service();
        let identity = Identity { user_id, email: "p@example.com".to_string(), role: r };
        let token = tokens.issue_at(&identity, tt, issued).unwrap();
        let lifetime = tokens.lifetime(tt);

        let within = issued + ((lifetime as f64) * elapsed_fraction) as i64;
        let within = within.min(issued + lifetime - 1);
        let claims = tokens.verify_at(&token, tt, within).unwrap();
        prop_assert_eq!(claims.sub, user_id);
        prop_assert_eq!(claims.role, r);
        prop_assert_eq!(claims.exp - claims.iat, lifetime);

        assert_matches!(
            tokens.verify_at(&token, tt, issued + lifetime),
            Err(BackendError::ExpiredToken)
        );
    }

    #[test]
    fn prop_token_type_is_enforced(
        user_id in uuid(),
        issued_as in token_type(),
        presented_as in token_type(),
    ) {
        prop_assume!(issued_as != presented_as);
        let tokens = service();
        let identity = Identity { user_id, email: "p@example.com".to_string(), role: Role::Regular };
        let token = tokens.issue_at(&identity, issued_as, 1_700_000_000).unwrap();

        assert_matches!(
            tokens.verify_at(&token, presented_as, 1_700_000_001),
            Err(BackendError::InvalidToken { .. })
        );
    }

    #[test]
    fn prop_parsed_tags_are_distinct_and_bounded(raw in "[a-e ,]{0,40}") {
        if let Ok(tags) = parse_tags(&raw) {
            prop_assert!(tags.len() <= MAX_TAGS_PER_PHOTO);
            let mut unique = tags.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), tags.len());
            for tag in &tags {
                prop_assert!(!tag.is_empty());
                prop_assert_eq!(tag.trim(), tag.as_str());
            }
        }
    }
}
