use crate::app_lib::AppError;
use crate::components::{Alert, AlertKind, AppShell, Button, Spinner, TextInput};
use crate::features::auth::client;
use crate::features::auth::types::EmailRequest;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (error, set_error) = signal::<Option<AppError>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);

    let forgot_action = Action::new_local(move |request: &EmailRequest| {
        let request = request.clone();
        async move { client::forgot_password(&request).await }
    });

    Effect::new(move |_| {
        if let Some(result) = forgot_action.value().get() {
            match result {
                Ok(success) => set_notice.set(Some(success.message)),
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);
        set_notice.set(None);

        let email_value = email.get_untracked().trim().to_string();
        if email_value.is_empty() {
            set_error.set(Some(AppError::Config("Email is required.".to_string())));
            return;
        }
        forgot_action.dispatch(EmailRequest { email: email_value });
    };

    view! {
        <AppShell>
            <form class="max-w-sm mx-auto" on:submit=on_submit>
                <h1 class="text-2xl font-semibold text-gray-900 dark:text-white mb-2">
                    "Forgot your password?"
                </h1>
                <p class="text-sm text-gray-500 dark:text-gray-400 mb-6">
                    "We'll email you a reset code valid for one hour."
                </p>
                <TextInput
                    id="email"
                    label="Your email"
                    input_type="email"
                    autocomplete="email"
                    placeholder="name@inbox.im"
                    set_value=set_email
                />
                <Button button_type="submit" disabled=forgot_action.pending()>
                    "Send reset code"
                </Button>
                <div class="mt-4 text-sm">
                    <A
                        href="/reset-password"
                        {..}
                        class="text-blue-600 hover:text-blue-800 dark:text-blue-400"
                    >
                        "Already have a code?"
                    </A>
                </div>
                {move || {
                    forgot_action
                        .pending()
                        .get()
                        .then_some(view! { <div class="mt-4"><Spinner /></div> })
                }}
                {move || {
                    notice
                        .get()
                        .map(|message| {
                            view! {
                                <div class="mt-4">
                                    <Alert kind=AlertKind::Success message=message />
                                </div>
                            }
                        })
                }}
                {move || {
                    error
                        .get()
                        .map(|err| {
                            view! {
                                <div class="mt-4">
                                    <Alert kind=AlertKind::Error message=err.user_message() />
                                </div>
                            }
                        })
                }}
            </form>
        </AppShell>
    }
}
