//! Self-service profile page: username, bio, avatar upload, and password
//! change. Everything rides in one multipart PATCH so the avatar file and
//! text fields land together.

use crate::app_lib::AppError;
use crate::components::{Alert, AlertKind, AppShell, Button, Spinner, TextInput};
use crate::features::auth::guards::RequireAuth;
use crate::features::auth::state::use_auth;
use crate::features::users::client;
use leptos::ev::SubmitEvent;
use leptos::html::Input;
use leptos::prelude::*;
use web_sys::FormData;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let (username, set_username) = signal(String::new());
    let (bio, set_bio) = signal(String::new());
    let (current_password, set_current_password) = signal(String::new());
    let (new_password, set_new_password) = signal(String::new());
    let (error, set_error) = signal::<Option<AppError>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);
    let avatar_input: NodeRef<Input> = NodeRef::new();

    let update_action = Action::new_local(move |form: &FormData| {
        let form = form.clone();
        async move { client::update_profile(form).await }
    });

    Effect::new(move |_| {
        if let Some(result) = update_action.value().get() {
            match result {
                Ok(success) => {
                    if let Some(user) = success.data {
                        auth.set_session(user);
                    }
                    set_notice.set(Some(success.message));
                    set_current_password.set(String::new());
                    set_new_password.set(String::new());
                }
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);
        set_notice.set(None);

        let form = match FormData::new() {
            Ok(form) => form,
            Err(_) => {
                set_error.set(Some(AppError::Config(
                    "Failed to build the form payload.".to_string(),
                )));
                return;
            }
        };

        let username_value = username.get_untracked().trim().to_string();
        if !username_value.is_empty() {
            let _ = form.append_with_str("username", &username_value);
        }
        let bio_value = bio.get_untracked();
        if !bio_value.trim().is_empty() {
            let _ = form.append_with_str("bio", bio_value.trim());
        }

        let new_password_value = new_password.get_untracked();
        if !new_password_value.is_empty() {
            let current_value = current_password.get_untracked();
            if current_value.is_empty() {
                set_error.set(Some(AppError::Config(
                    "Enter your current password to set a new one.".to_string(),
                )));
                return;
            }
            let _ = form.append_with_str("currentPassword", &current_value);
            let _ = form.append_with_str("newPassword", &new_password_value);
        }

        if let Some(input) = avatar_input.get_untracked() {
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                let _ = form.append_with_blob("avatar", &file);
            }
        }

        update_action.dispatch(form);
    };

    view! {
        <AppShell>
            <RequireAuth>
                <div class="max-w-lg mx-auto space-y-6">
                    <h1 class="text-2xl font-semibold text-gray-900 dark:text-white">
                        "Your profile"
                    </h1>
                    {move || {
                        auth.session
                            .get()
                            .map(|user| {
                                view! {
                                    <div class="flex items-center gap-4">
                                        {user.avatar.clone().map(|src| view! {
                                            <img
                                                src=src
                                                alt="Avatar"
                                                class="h-16 w-16 rounded-full object-cover border border-gray-200 dark:border-gray-700"
                                            />
                                        })}
                                        <div>
                                            <div class="font-medium text-gray-900 dark:text-white">
                                                {user.username.clone()}
                                            </div>
                                            <div class="text-sm text-gray-500 dark:text-gray-400">
                                                {user.email.clone()}
                                            </div>
                                            <div class="text-xs text-gray-400 dark:text-gray-500">
                                                {if user.is_verified { "Verified" } else { "Not verified" }}
                                            </div>
                                        </div>
                                    </div>
                                }
                            })
                    }}
                    <form on:submit=on_submit>
                        <TextInput
                            id="username"
                            label="Username"
                            autocomplete="username"
                            required=false
                            set_value=set_username
                        />
                        <div class="mb-5">
                            <label
                                class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                                for="bio"
                            >
                                "Bio"
                            </label>
                            <textarea
                                id="bio"
                                rows="3"
                                class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg focus:ring-blue-500 focus:border-blue-500 block w-full p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:placeholder-gray-400 dark:text-white"
                                on:input=move |event| set_bio.set(event_target_value(&event))
                            ></textarea>
                        </div>
                        <div class="mb-5">
                            <label
                                class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                                for="avatar"
                            >
                                "Avatar"
                            </label>
                            <input
                                id="avatar"
                                type="file"
                                accept="image/*"
                                node_ref=avatar_input
                                class="block w-full text-sm text-gray-900 border border-gray-300 rounded-lg cursor-pointer bg-gray-50 dark:text-gray-400 dark:bg-gray-700 dark:border-gray-600"
                            />
                        </div>
                        <TextInput
                            id="current-password"
                            label="Current password"
                            input_type="password"
                            autocomplete="current-password"
                            required=false
                            set_value=set_current_password
                        />
                        <TextInput
                            id="new-password"
                            label="New password"
                            input_type="password"
                            autocomplete="new-password"
                            required=false
                            set_value=set_new_password
                        />
                        <Button button_type="submit" disabled=update_action.pending()>
                            "Save changes"
                        </Button>
                        {move || {
                            update_action
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
                </div>
            </RequireAuth>
        </AppShell>
    }
}
