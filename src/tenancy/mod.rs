//! Users, companies (tenants) and the role linking them.

pub mod storage;

pub use storage::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyRole {
    Owner,
    Admin,
    Member,
}

impl std::fmt::Display for CompanyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for CompanyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            _ => Err(format!("Unknown company role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(CompanyRole::Owner.to_string(), "OWNER");
        assert_eq!("ADMIN".parse::<CompanyRole>(), Ok(CompanyRole::Admin));
        assert!("owner".parse::<CompanyRole>().is_err());
    }
}
