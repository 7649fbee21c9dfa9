use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("form is missing the {attribute} attribute"));

    assert_eq!(
        got, endpoint,
        "want form with {attribute}=\"{endpoint}\", got {got:?}"
    );
}

#[track_caller]
fn must_get_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("input[name=\"{name}\"]")).unwrap();

    form.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""))
}

/// Checks that `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_get_input(form, name);

    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        got_type, type_,
        "want input \"{name}\" with type \"{type_}\", got {got_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input \"{name}\" to have the required attribute"
    );
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_form_input(form, name, type_);

    let got_value = must_get_input(form, name)
        .value()
        .attr("value")
        .unwrap_or_default()
        .to_owned();
    assert_eq!(
        got_value, value,
        "want input \"{name}\" with value \"{value}\", got {got_value:?}"
    );
}

/// Checks that `form` has a select called `name` whose options include `want_options`
/// and, if `selected` is given, that option is the selected one.
#[track_caller]
pub(crate) fn assert_form_select(
    form: &ElementRef<'_>,
    name: &str,
    want_options: &[&str],
    selected: Option<&str>,
) {
    let select_selector = Selector::parse(&format!("select[name=\"{name}\"]")).unwrap();
    let select = form
        .select(&select_selector)
        .next()
        .unwrap_or_else(|| panic!("No select found with name \"{name}\""));

    let option_selector = Selector::parse("option").unwrap();
    let options = select
        .select(&option_selector)
        .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
        .collect::<Vec<_>>();

    for want in want_options {
        assert!(
            options.iter().any(|option| option == want),
            "want option \"{want}\" in select \"{name}\", got {options:?}"
        );
    }

    if let Some(selected) = selected {
        let selected_selector = Selector::parse("option[selected]").unwrap();
        let got_selected = select
            .select(&selected_selector)
            .next()
            .and_then(|option| option.value().attr("value"));
        assert_eq!(got_selected, Some(selected));
    }
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button[type=\"submit\"]").unwrap())
        .next();

    assert!(
        submit_button.is_some(),
        "want a button with type=\"submit\" in the form"
    );
}

/// Checks the text of the first `<p>` in `form`, which is where form errors are rendered.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let error_message = form
        .select(&Selector::parse("p").unwrap())
        .next()
        .expect("No error message found")
        .text()
        .collect::<String>();

    assert_eq!(want_error_message, error_message.trim());
}
