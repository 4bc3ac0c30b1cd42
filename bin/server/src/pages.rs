//! Server-rendered pages.
//!
//! Every page is a Leptos component rendered straight to an HTML string;
//! nothing is hydrated on the client.

use leptos::prelude::*;

const DESIGN_SYSTEM_CSS: &str = "https://cdn.ons.gov.uk/sdc/design-system/70.0.0/css/main.css";

/// Message shown when the login form's anti-forgery token is missing or wrong.
pub const CSRF_FAILURE_MESSAGE: &str = "Request timed out, please try again";

fn document<V, F>(view: F) -> String
where
    F: FnOnce() -> V,
    V: IntoView,
{
    let owner = Owner::new();
    let body = owner.with(|| view().to_html());
    format!("<!DOCTYPE html>{body}")
}

#[component]
fn Layout(
    title: &'static str,
    #[prop(default = "en")] lang: &'static str,
    children: Children,
) -> impl IntoView {
    view! {
        <html lang=lang>
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
                <link rel="stylesheet" href=DESIGN_SYSTEM_CSS/>
            </head>
            <body>
                <main class="page__main">{children()}</main>
            </body>
        </html>
    }
}

/// Access-code entry form.
#[component]
pub fn LoginPage(
    csrf_token: String,
    code_length: usize,
    error: Option<String>,
    #[prop(default = "en")] lang: &'static str,
) -> impl IntoView {
    view! {
        <Layout title="Start survey" lang=lang>
            <h1>"Start survey"</h1>
            {error.map(|message| {
                view! {
                    <div class="panel panel--error" role="alert">
                        <p id="error-message">{message}</p>
                    </div>
                }
            })}
            <form method="post" action="/login">
                <input type="hidden" name="_csrf" value=csrf_token/>
                <label for="uac">
                    {format!("Enter your {code_length}-character access code")}
                </label>
                <input type="text" id="uac" name="uac" autocomplete="off"/>
                <button type="submit">"Access survey"</button>
            </form>
        </Layout>
    }
}

/// Confirmation shown after signing out.
#[component]
pub fn LogoutPage() -> impl IntoView {
    view! {
        <Layout title="You have signed out">
            <h1>"You have signed out"</h1>
            <p>"To continue with the survey, enter your access code again."</p>
            <a href="/login">"Start again"</a>
        </Layout>
    }
}

/// Shown when a session has expired mid-survey.
#[component]
pub fn TimedOutPage() -> impl IntoView {
    view! {
        <Layout title="Sorry, you need to sign in again">
            <h1>"Sorry, you need to sign in again"</h1>
            <p>"This is because you have been inactive for a while."</p>
            <a href="/login">"Sign in"</a>
        </Layout>
    }
}

/// Shown when the login form could not be trusted.
#[component]
pub fn RequestRejectedPage() -> impl IntoView {
    view! {
        <Layout title="Request timed out">
            <h1>{CSRF_FAILURE_MESSAGE}</h1>
            <a href="/login">"Return to the start page"</a>
        </Layout>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <Layout title="Page not found">
            <h1>"Page not found"</h1>
            <p>"If you entered a web address, check it is correct."</p>
        </Layout>
    }
}

/// Renders the login page in `lang`, optionally with an error message.
pub fn login(
    csrf_token: String,
    code_length: usize,
    error: Option<String>,
    lang: &'static str,
) -> String {
    document(move || {
        view! {
            <LoginPage csrf_token=csrf_token code_length=code_length error=error lang=lang/>
        }
    })
}

/// Renders the signed-out confirmation.
pub fn logout() -> String {
    document(|| view! { <LogoutPage/> })
}

/// Renders the session timed-out page.
pub fn timed_out() -> String {
    document(|| view! { <TimedOutPage/> })
}

/// Renders the anti-forgery failure page.
pub fn request_rejected() -> String {
    document(|| view! { <RequestRejectedPage/> })
}

/// Renders the not-found page.
pub fn not_found() -> String {
    document(|| view! { <NotFoundPage/> })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_carries_csrf_token_and_length() {
        let html = login("tok-123".to_string(), 16, None, "en");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"lang="en""#));
        assert!(html.contains("tok-123"));
        assert!(html.contains("Enter your 16-character access code"));
        assert!(!html.contains("error-message"));
    }

    #[test]
    fn login_page_shows_error() {
        let html = login(
            "tok".to_string(),
            12,
            Some("Enter a 12-character access code".to_string()),
            "en",
        );
        assert!(html.contains("error-message"));
        assert!(html.contains("Enter a 12-character access code"));
    }

    #[test]
    fn login_page_escapes_error() {
        let html = login("tok".to_string(), 12, Some("<script>".to_string()), "en");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn login_page_carries_language() {
        let html = login("tok".to_string(), 12, None, "cy");
        assert!(html.contains(r#"lang="cy""#));
    }

    #[test]
    fn static_pages_render() {
        assert!(logout().contains(r#"lang="en""#));
        assert!(logout().contains("You have signed out"));
        assert!(timed_out().contains("Sorry, you need to sign in again"));
        assert!(request_rejected().contains(CSRF_FAILURE_MESSAGE));
        assert!(not_found().contains("Page not found"));
    }
}
