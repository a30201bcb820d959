//! Assertion profile and vendor attribute overrides.
//!
//! Cloud consoles each want their own NameID shape and attribute set.
//! The quirks live here as an ordered list of transforms over one
//! profile; the order is observable by relying parties (Aliyun rewrites
//! the NameID before AWS gets a chance to) and must not change.

use idsphere_db::models::{Site, Subject};

/// `urn:oasis` unspecified NameID format.
pub const NAMEID_FORMAT_UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified";

/// `urn:oasis` email NameID format.
pub const NAMEID_FORMAT_EMAIL: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";

/// A single-valued SAML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlAttribute {
    pub name: String,
    pub value: String,
}

/// The subject identity an assertion will carry.
#[derive(Debug, Clone)]
pub struct AssertionProfile {
    pub name_id: String,
    pub name_id_format: String,
    pub attributes: Vec<SamlAttribute>,
}

struct TransformCtx<'a> {
    site: &'a Site,
    subject: &'a Subject,
    sp_entity_id: &'a str,
}

type Transform = fn(&mut AssertionProfile, &TransformCtx<'_>);

/// The ordered transform chain. Aliyun runs before AWS; the Huawei,
/// CTYun and generic attributes are added unconditionally.
const TRANSFORMS: &[Transform] = &[aliyun_ram, aws_sso, huawei_iam, ctyun_iam, generic];

/// Build the assertion profile for a subject logging in to a site.
#[must_use]
pub fn build_profile(site: &Site, subject: &Subject, sp_entity_id: &str) -> AssertionProfile {
    let mut profile = AssertionProfile {
        name_id: subject.username.clone(),
        name_id_format: NAMEID_FORMAT_UNSPECIFIED.to_string(),
        attributes: Vec::new(),
    };

    let ctx = TransformCtx {
        site,
        subject,
        sp_entity_id,
    };
    for transform in TRANSFORMS {
        transform(&mut profile, &ctx);
    }

    profile
}

/// Aliyun RAM wants `<username>@<domain_id>` as the NameID.
fn aliyun_ram(profile: &mut AssertionProfile, ctx: &TransformCtx<'_>) {
    if ctx.sp_entity_id.starts_with("https://signin.aliyun.com") {
        profile.name_id = format!(
            "{}@{}",
            ctx.subject.username,
            ctx.site.domain_id.as_deref().unwrap_or_default()
        );
    }
}

/// AWS IAM Identity Center keys sessions on the email address.
fn aws_sso(profile: &mut AssertionProfile, ctx: &TransformCtx<'_>) {
    let address = ctx.site.address.as_deref().unwrap_or_default();
    if address.contains("awsapps") {
        profile.name_id_format = NAMEID_FORMAT_EMAIL.to_string();
        profile.name_id = ctx.subject.email.clone();
        push(profile, "username", &ctx.subject.email);
    }
}

/// Huawei Cloud IAM federation attributes.
fn huawei_iam(profile: &mut AssertionProfile, ctx: &TransformCtx<'_>) {
    push(profile, "IAM_SAML_Attributes_xUserId", &ctx.subject.username);
    push(
        profile,
        "IAM_SAML_Attributes_redirect_url",
        ctx.site.redirect_url.as_deref().unwrap_or_default(),
    );
    push(
        profile,
        "IAM_SAML_Attributes_domain_id",
        ctx.site.domain_id.as_deref().unwrap_or_default(),
    );
    push(
        profile,
        "IAM_SAML_Attributes_idp_id",
        ctx.site.idp_name.as_deref().unwrap_or_default(),
    );
}

/// CTYun IAM federation attributes.
fn ctyun_iam(profile: &mut AssertionProfile, ctx: &TransformCtx<'_>) {
    let domain_id = ctx.site.domain_id.as_deref().unwrap_or_default();
    push(profile, "nickName", &ctx.subject.name);
    push(profile, "accountId", domain_id);
    push(
        profile,
        "userId",
        ctx.subject.ctyun_id.as_deref().unwrap_or_default(),
    );
    push(profile, "idpId", domain_id);
}

/// Generic identity attributes every SP receives.
fn generic(profile: &mut AssertionProfile, ctx: &TransformCtx<'_>) {
    push(profile, "name", &ctx.subject.name);
    push(profile, "username", &ctx.subject.username);
    push(profile, "email", &ctx.subject.email);
    push(profile, "phone_number", &ctx.subject.phone_number);
}

fn push(profile: &mut AssertionProfile, name: &str, value: &str) {
    profile.attributes.push(SamlAttribute {
        name: name.to_string(),
        value: value.to_string(),
    });
}
