use crate::app_lib::AppError;
use crate::components::{Alert, AlertKind, AppShell, Button, Spinner, TextInput};
use crate::features::auth::client;
use crate::features::auth::state::use_auth;
use crate::features::auth::types::{EmailRequest, VerifyOtpRequest};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

#[component]
pub fn VerifyEmailPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let (email, set_email) = signal(String::new());
    let (otp, set_otp) = signal(String::new());
    let (error, set_error) = signal::<Option<AppError>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);

    let verify_action = Action::new_local(move |request: &VerifyOtpRequest| {
        let request = request.clone();
        async move { client::verify_otp(&request).await }
    });

    let resend_action = Action::new_local(move |request: &EmailRequest| {
        let request = request.clone();
        async move { client::resend_otp(&request).await }
    });

    Effect::new(move |_| {
        if let Some(result) = verify_action.value().get() {
            match result {
                Ok(_) => {
                    // The session user is stale now; rehydrate before leaving.
                    leptos::task::spawn_local(async move {
                        if let Ok(Some(session)) = client::fetch_session().await {
                            auth.set_session(session);
                        }
                    });
                    navigate("/", Default::default());
                }
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    Effect::new(move |_| {
        if let Some(result) = resend_action.value().get() {
            match result {
                Ok(success) => set_notice.set(Some(success.message)),
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    let current_email = move || {
        let typed = email.get_untracked().trim().to_string();
        if !typed.is_empty() {
            return typed;
        }
        auth.session
            .get_untracked()
            .map(|user| user.email)
            .unwrap_or_default()
    };

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);
        set_notice.set(None);

        let email_value = current_email();
        let otp_value = otp.get_untracked().trim().to_string();
        if email_value.is_empty() || otp_value.is_empty() {
            set_error.set(Some(AppError::Config(
                "Email and verification code are required.".to_string(),
            )));
            return;
        }

        verify_action.dispatch(VerifyOtpRequest {
            email: email_value,
            otp: otp_value,
        });
    };

    let on_resend = move |_| {
        set_error.set(None);
        set_notice.set(None);

        let email_value = current_email();
        if email_value.is_empty() {
            set_error.set(Some(AppError::Config("Email is required.".to_string())));
            return;
        }
        resend_action.dispatch(EmailRequest { email: email_value });
    };

    let pending = Signal::derive(move || {
        verify_action.pending().get() || resend_action.pending().get()
    });

    view! {
        <AppShell>
            <form class="max-w-sm mx-auto" on:submit=on_submit>
                <h1 class="text-2xl font-semibold text-gray-900 dark:text-white mb-2">
                    "Verify your email"
                </h1>
                <p class="text-sm text-gray-500 dark:text-gray-400 mb-6">
                    "Enter the 6-digit code we emailed you. Leave the email field empty to use your signed-in address."
                </p>
                <TextInput
                    id="email"
                    label="Your email"
                    input_type="email"
                    autocomplete="email"
                    required=false
                    set_value=set_email
                />
                <TextInput
                    id="otp"
                    label="Verification code"
                    autocomplete="one-time-code"
                    placeholder="123456"
                    set_value=set_otp
                />
                <div class="flex items-center gap-4">
                    <Button button_type="submit" disabled=pending>
                        "Verify"
                    </Button>
                    <button
                        type="button"
                        class="text-sm text-blue-600 hover:text-blue-800 dark:text-blue-400"
                        on:click=on_resend
                    >
                        "Resend code"
                    </button>
                </div>
                {move || {
                    pending
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
