//! Principal resolution and projection into the local directory.

use warden_core::{AppError, AppResult};
use warden_entity::{AuthRecord, LocalUser, PrincipalRecord};
use warden_extension::AuthenticationProfile;
use warden_extension::traits::fetch_principal_record;

/// Asks the profile's authorizer for the principal behind `auth_record`.
pub async fn resolve_principal(
    profile: &AuthenticationProfile,
    auth_record: &AuthRecord,
) -> AppResult<Option<PrincipalRecord>> {
    fetch_principal_record(profile.authz.as_ref(), auth_record).await
}

/// Projects a principal record into a local user of directory `authz_name`.
///
/// The external id is the record's `ID`, falling back to `NAME`; the login
/// name is `NAME`, falling back to `PRINCIPAL`. A record with neither `ID`
/// nor `NAME` cannot be keyed and is rejected.
pub fn map_principal_record_to_user(
    authz_name: &str,
    record: &PrincipalRecord,
) -> AppResult<LocalUser> {
    let external_id = record.id().or(record.name()).ok_or_else(|| {
        AppError::protocol(format!(
            "Principal record from '{authz_name}' carries neither ID nor NAME"
        ))
    })?;
    let login_name = record
        .name()
        .or(record.principal())
        .unwrap_or(external_id);

    let mut user = LocalUser::new(external_id, login_name, authz_name);
    user.namespace = record.namespace().map(str::to_string);
    user.first_name = record.first_name().map(str::to_string);
    user.last_name = record.last_name().map(str::to_string);
    user.email = record.email().map(str::to_string);
    user.department = record.department().map(str::to_string);
    user.group_ids = record.group_ids();
    Ok(user)
}
