#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod state;

pub(crate) use form::{
    assert_form_action, assert_form_error_message, assert_form_input,
    assert_form_submit_button_with_text, must_get_form,
};
pub(crate) use html::{
    assert_valid_html, parse_html_document, parse_html_fragment, select_text, selector_count,
};
pub(crate) use http::{assert_redirect, assert_status_ok};
pub(crate) use state::{TEST_EMAIL, TEST_PASSWORD, get_test_state, get_test_state_with_user};
