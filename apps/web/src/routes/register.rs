use crate::app_lib::AppError;
use crate::components::{Alert, AlertKind, AppShell, Button, Spinner, TextInput};
use crate::features::auth::client;
use crate::features::auth::state::use_auth;
use crate::features::auth::types::RegisterRequest;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (error, set_error) = signal::<Option<AppError>>(None);

    let register_action = Action::new_local(move |request: &RegisterRequest| {
        let request = request.clone();
        async move { client::register(&request).await }
    });

    Effect::new(move |_| {
        if let Some(result) = register_action.value().get() {
            match result {
                Ok(success) => {
                    if let Some(user) = success.data {
                        auth.set_session(user);
                    }
                    // Straight to verification; the code is already in the inbox.
                    navigate("/verify-email", Default::default());
                }
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);

        let password_value = password.get_untracked();
        let confirm_value = confirm.get_untracked();
        if password_value != confirm_value {
            set_error.set(Some(AppError::Config("Passwords do not match.".to_string())));
            return;
        }

        register_action.dispatch(RegisterRequest {
            username: username.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            password: password_value,
            confirm_password: confirm_value,
        });
    };

    view! {
        <AppShell>
            <form class="max-w-sm mx-auto" on:submit=on_submit>
                <h1 class="text-2xl font-semibold text-gray-900 dark:text-white mb-6">
                    "Create your account"
                </h1>
                <TextInput
                    id="username"
                    label="Username"
                    autocomplete="username"
                    set_value=set_username
                />
                <TextInput
                    id="email"
                    label="Your email"
                    input_type="email"
                    autocomplete="email"
                    placeholder="name@inbox.im"
                    set_value=set_email
                />
                <TextInput
                    id="password"
                    label="Password"
                    input_type="password"
                    autocomplete="new-password"
                    set_value=set_password
                />
                <TextInput
                    id="confirm-password"
                    label="Confirm password"
                    input_type="password"
                    autocomplete="new-password"
                    set_value=set_confirm
                />
                <Button button_type="submit" disabled=register_action.pending()>
                    "Sign Up"
                </Button>
                {move || {
                    register_action
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
