use anyhow::{Result, bail};
use tabletop_core::Role;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated role list; `all` selects every role.
pub fn parse_roles(s: &str) -> Result<Vec<Role>> {
    let mut roles = Vec::new();
    for token in split_csv(s) {
        if token.eq_ignore_ascii_case("all") {
            return Ok(Role::ALL.to_vec());
        }
        let Ok(role) = token.to_ascii_uppercase().parse::<Role>() else {
            bail!("unknown role '{token}' (expected CISO, SOC_LEAD, DFIR, IT_MANAGER or all)");
        };
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    if roles.is_empty() {
        bail!("at least one role is required");
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn parse_roles_accepts_names_and_all() {
        assert_eq!(parse_roles("all").unwrap(), Role::ALL.to_vec());
        assert_eq!(
            parse_roles("ciso, dfir,CISO").unwrap(),
            vec![Role::Ciso, Role::Dfir]
        );
        assert!(parse_roles("janitor").is_err());
        assert!(parse_roles(" , ").is_err());
    }
}
