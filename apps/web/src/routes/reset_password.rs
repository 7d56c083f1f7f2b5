use crate::app_lib::AppError;
use crate::components::{Alert, AlertKind, AppShell, Button, Spinner, TextInput};
use crate::features::auth::client;
use crate::features::auth::types::ResetPasswordRequest;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let navigate = use_navigate();
    let (email, set_email) = signal(String::new());
    let (otp, set_otp) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (error, set_error) = signal::<Option<AppError>>(None);

    let reset_action = Action::new_local(move |request: &ResetPasswordRequest| {
        let request = request.clone();
        async move { client::reset_password(&request).await }
    });

    Effect::new(move |_| {
        if let Some(result) = reset_action.value().get() {
            match result {
                Ok(_) => navigate("/login", Default::default()),
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);

        let password_value = password.get_untracked();
        if password_value != confirm.get_untracked() {
            set_error.set(Some(AppError::Config("Passwords do not match.".to_string())));
            return;
        }

        reset_action.dispatch(ResetPasswordRequest {
            email: email.get_untracked().trim().to_string(),
            otp: otp.get_untracked().trim().to_string(),
            new_password: password_value,
        });
    };

    view! {
        <AppShell>
            <form class="max-w-sm mx-auto" on:submit=on_submit>
                <h1 class="text-2xl font-semibold text-gray-900 dark:text-white mb-6">
                    "Choose a new password"
                </h1>
                <TextInput
                    id="email"
                    label="Your email"
                    input_type="email"
                    autocomplete="email"
                    set_value=set_email
                />
                <TextInput
                    id="otp"
                    label="Reset code"
                    autocomplete="one-time-code"
                    placeholder="123456"
                    set_value=set_otp
                />
                <TextInput
                    id="password"
                    label="New password"
                    input_type="password"
                    autocomplete="new-password"
                    set_value=set_password
                />
                <TextInput
                    id="confirm-password"
                    label="Confirm new password"
                    input_type="password"
                    autocomplete="new-password"
                    set_value=set_confirm
                />
                <Button button_type="submit" disabled=reset_action.pending()>
                    "Reset password"
                </Button>
                {move || {
                    reset_action
                        .pending()
                        .get()
                        .then_some(view! { <div class="mt-4"><Spinner /></div> })
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
