use std::collections::HashMap;
use std::time::Duration;

use form_validator::{
    validate, Document, FieldAccessor, FieldKey, FormRuntime, FormValidator, NodeId, Phase,
    RegistrationPage, ValidatorConfig, INVALID_SUMMARY, SUCCESS_SUMMARY,
};
use pretty_assertions::assert_eq;

/// Accessor backed by a plain map, no document involved.
struct MapFields(HashMap<FieldKey, String>);

impl FieldAccessor for MapFields {
    fn element(&self, _field: FieldKey) -> Option<NodeId> {
        None
    }

    fn value(&self, field: FieldKey) -> Option<String> {
        self.0.get(&field).cloned()
    }
}

fn map_fields(entries: &[(FieldKey, &str)]) -> MapFields {
    MapFields(
        entries
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect(),
    )
}

fn attach() -> FormValidator {
    let page = RegistrationPage::new().build().unwrap();
    FormValidator::attach(page, ValidatorConfig::default()).unwrap()
}

fn errors_in(doc: &Document, form: NodeId) -> Vec<String> {
    doc.find_descendants_by_class(form, "form-error")
        .unwrap()
        .into_iter()
        .map(|n| doc.text(n).unwrap().to_string())
        .collect()
}

#[test]
fn rules_run_against_injected_accessor() {
    let fields = map_fields(&[
        (FieldKey::Name, "Ada"),
        (FieldKey::Email, "foo@bar"),
        (FieldKey::Password, "longenough1"),
        (FieldKey::Confirm, "longenough1"),
        (FieldKey::Number, "(123) 456-7890"),
    ]);
    let report = validate(&fields.snapshot());
    let failed: Vec<_> = report.failures().map(|r| (r.field, r.message)).collect();
    assert_eq!(
        failed,
        vec![(FieldKey::Email, "Please enter a valid email address.")]
    );
}

#[test]
fn validator_reads_values_through_injected_accessor() {
    let mut v = attach();
    let fields = map_fields(&[
        (FieldKey::Name, "Ada"),
        (FieldKey::Email, "ada@example.com"),
        (FieldKey::Password, "Abc12345"),
        (FieldKey::Confirm, "Abc1234"),
    ]);
    v.submit_from(&fields).unwrap();

    // the document's own inputs are still blank; only the mismatch is reported
    assert_eq!(errors_in(v.document(), v.form()), vec!["Passwords do not match."]);
    let confirm = v.fields().element(FieldKey::Confirm).unwrap();
    assert_eq!(
        v.document().attribute(confirm, "aria-invalid").unwrap(),
        Some("true")
    );

    let fields = map_fields(&[
        (FieldKey::Name, "Ada"),
        (FieldKey::Email, "ada@example.com"),
        (FieldKey::Password, "Abc12345"),
        (FieldKey::Confirm, "Abc12345"),
    ]);
    let effects = v.submit_from(&fields).unwrap();
    assert_eq!(v.phase(), Phase::Locked);
    assert!(errors_in(v.document(), v.form()).is_empty());
    assert!(!effects.is_empty());
}

#[test]
fn each_blank_required_field_is_reported_alone() {
    let valid = [
        (FieldKey::Name, "Ada"),
        (FieldKey::Email, "foo@bar.com"),
        (FieldKey::Password, "Abc12345"),
        (FieldKey::Confirm, "Abc12345"),
    ];
    for blank in [FieldKey::Name, FieldKey::Email, FieldKey::Password] {
        let mut v = attach();
        for (field, value) in valid {
            v.enter_value(field, value).unwrap();
        }
        v.enter_value(blank, "").unwrap();
        if blank == FieldKey::Password {
            // keep the confirmation consistent so only the length rule fires
            v.enter_value(FieldKey::Confirm, "").unwrap();
        }
        v.on_submit().unwrap();

        let errors = errors_in(v.document(), v.form());
        assert_eq!(errors.len(), 1, "blank {blank}: {errors:?}");
        let report = v.last_report().unwrap();
        assert_eq!(report.failures().next().unwrap().field, blank);

        let alert = v
            .document()
            .find_first_by_class(v.form(), "form-alert")
            .unwrap()
            .unwrap();
        assert_eq!(v.document().text(alert).unwrap(), INVALID_SUMMARY);
    }
}

#[test]
fn full_page_html_after_failed_submit() {
    let page = RegistrationPage::new()
        .without_field(FieldKey::Password)
        .without_field(FieldKey::Confirm)
        .without_field(FieldKey::Number)
        .build()
        .unwrap();
    let mut v = FormValidator::attach(page, ValidatorConfig::default()).unwrap();
    v.enter_value(FieldKey::Email, "foo@bar.com").unwrap();
    v.on_submit().unwrap();

    let html = v.document().to_html(v.form()).unwrap();
    assert_eq!(
        html,
        "<form class=\"registration-form\" novalidate=\"\">\
         <div class=\"form-alert alert alert-danger\" aria-live=\"polite\" role=\"status\">\
         Please fix the errors above and try again.</div>\
         <div class=\"form-group\">\
         <label for=\"name\">Full name</label>\
         <input id=\"name\" aria-invalid=\"true\" name=\"name\" type=\"text\">\
         <div class=\"form-error\" data-field=\"name\">Please enter your name.</div>\
         </div>\
         <div class=\"form-group\">\
         <label for=\"email\">Email</label>\
         <input id=\"email\" name=\"email\" type=\"email\" value=\"foo@bar.com\">\
         </div>\
         <button type=\"submit\">Register</button>\
         <button type=\"reset\">Clear</button>\
         </form>"
    );
}

#[test]
fn custom_classes_from_config() {
    let config = ValidatorConfig {
        form_class: "signup".to_string(),
        group_class: "field".to_string(),
        ..ValidatorConfig::default()
    };
    let page = RegistrationPage::new()
        .classes("signup", "field")
        .build()
        .unwrap();
    let mut v = FormValidator::attach(page, config).unwrap();
    v.on_submit().unwrap();

    let doc = v.document();
    let name = v.fields().element(FieldKey::Name).unwrap();
    let group = doc.closest_with_class(name, "field").unwrap().unwrap();
    let last = *doc.children(group).unwrap().last().unwrap();
    assert!(doc.has_class(last, "form-error").unwrap());
}

#[tokio::test(start_paused = true)]
async fn submission_lifecycle_through_runtime() {
    let (handle, join) = FormRuntime::spawn(attach());

    handle.input(FieldKey::Name, "Ada Lovelace").unwrap();
    handle.input(FieldKey::Email, "ada@example.com").unwrap();
    handle.input(FieldKey::Password, "Abc12345").unwrap();
    handle.input(FieldKey::Confirm, "Abc12345 ").unwrap();
    handle.submit().unwrap();

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Idle);
    assert_eq!(snap.alert.as_deref(), Some(INVALID_SUMMARY));
    assert!(snap.html.contains("Passwords do not match."));

    // typing into the confirmation clears its error
    handle.input(FieldKey::Confirm, "Abc12345").unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert!(!snap.html.contains("form-error"));
    assert!(!snap.html.contains("aria-invalid"));

    handle.submit().unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Locked);
    assert_eq!(snap.alert.as_deref(), Some(SUCCESS_SUMMARY));
    assert_eq!(snap.html.matches(" disabled").count(), 7);

    // a second submit during the lockout changes nothing
    handle.submit().unwrap();
    assert_eq!(handle.snapshot().await.unwrap().pending_timers, 2);

    tokio::time::sleep(Duration::from_millis(1199)).await;
    assert_eq!(handle.snapshot().await.unwrap().phase, Phase::Locked);

    tokio::time::sleep(Duration::from_millis(2)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Idle);
    assert!(!snap.html.contains("disabled"));
    assert_eq!(snap.alert, None);
    for field in FieldKey::all() {
        assert_eq!(snap.values.get(field), Some(""));
    }

    drop(handle);
    let validator = join.await.unwrap();
    assert_eq!(validator.pending_tasks().count(), 0);
}
