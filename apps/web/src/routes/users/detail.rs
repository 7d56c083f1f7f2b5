//! Staff view of a single account with a privileged edit form and, for
//! admins, deletion.

use crate::app_lib::AppError;
use crate::components::{Alert, AlertKind, AppShell, Button, Spinner};
use crate::features::auth::guards::RequireStaff;
use crate::features::auth::state::use_auth;
use crate::features::users::{client, types::AdminUpdateRequest};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_params};
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone)]
struct UserParams {
    id: Option<String>,
}

#[component]
pub fn UserDetailPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let params = use_params::<UserParams>();
    let user_id = move || {
        params
            .get()
            .ok()
            .and_then(|params| params.id)
            .unwrap_or_default()
    };

    let user = LocalResource::new(move || {
        let id = user_id();
        async move {
            if id.trim().is_empty() {
                return Err(AppError::Config("User id is required.".to_string()));
            }
            client::get_user(&id).await
        }
    });

    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (role, set_role) = signal(String::new());
    let (verified, set_verified) = signal(String::new());
    let (error, set_error) = signal::<Option<AppError>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);

    let update_action = Action::new_local(move |input: &(String, AdminUpdateRequest)| {
        let (id, request) = input.clone();
        async move { client::update_user(&id, &request).await }
    });

    let delete_action = Action::new_local(move |id: &String| {
        let id = id.clone();
        async move { client::delete_user(&id).await }
    });

    Effect::new(move |_| {
        if let Some(result) = update_action.value().get() {
            match result {
                Ok(success) => {
                    set_notice.set(Some(success.message));
                    user.refetch();
                }
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    let navigate_after_delete = navigate.clone();
    Effect::new(move |_| {
        if let Some(result) = delete_action.value().get() {
            match result {
                Ok(_) => navigate_after_delete("/users", Default::default()),
                Err(err) => set_error.set(Some(err)),
            }
        }
    });

    let on_save = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);
        set_notice.set(None);

        let non_empty = |value: String| {
            let trimmed = value.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        };
        let request = AdminUpdateRequest {
            username: non_empty(username.get_untracked()),
            email: non_empty(email.get_untracked()),
            role: non_empty(role.get_untracked()),
            is_verified: match verified.get_untracked().as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                _ => None,
            },
        };
        update_action.dispatch((user_id(), request));
    };

    let on_delete = move |_| {
        set_error.set(None);
        set_notice.set(None);
        delete_action.dispatch(user_id());
    };

    view! {
        <AppShell>
            <RequireStaff>
                <div class="max-w-lg mx-auto block rounded-lg border border-gray-200 bg-white p-6 dark:border-gray-700 dark:bg-gray-800 space-y-4">
                    <h1 class="text-lg font-semibold text-gray-900 dark:text-white">
                        "User detail"
                    </h1>
                    <Suspense fallback=move || view! { <Spinner /> }>
                        {move || match user.get() {
                            Some(Ok(success)) => {
                                match success.data {
                                    Some(detail) => {
                                        view! {
                                            <div class="space-y-4">
                                                <div class="flex items-center gap-4">
                                                    {detail.avatar.clone().map(|src| view! {
                                                        <img
                                                            src=src
                                                            alt="Avatar"
                                                            class="h-12 w-12 rounded-full object-cover border border-gray-200 dark:border-gray-700"
                                                        />
                                                    })}
                                                    <div>
                                                        <div class="font-medium text-gray-900 dark:text-white">
                                                            {detail.username.clone()}
                                                        </div>
                                                        <div class="text-sm text-gray-500 dark:text-gray-400">
                                                            {detail.email.clone()}
                                                        </div>
                                                    </div>
                                                </div>
                                                <dl class="grid grid-cols-2 gap-2 text-sm">
                                                    <dt class="text-gray-500 dark:text-gray-400">"Role"</dt>
                                                    <dd class="text-gray-900 dark:text-white">{detail.role.clone()}</dd>
                                                    <dt class="text-gray-500 dark:text-gray-400">"Verified"</dt>
                                                    <dd class="text-gray-900 dark:text-white">
                                                        {if detail.is_verified { "Yes" } else { "No" }}
                                                    </dd>
                                                    <dt class="text-gray-500 dark:text-gray-400">"Last login"</dt>
                                                    <dd class="text-gray-900 dark:text-white">
                                                        {detail.last_login_at.clone().unwrap_or_else(|| "Never".to_string())}
                                                    </dd>
                                                    <dt class="text-gray-500 dark:text-gray-400">"Created"</dt>
                                                    <dd class="text-gray-900 dark:text-white">{detail.created_at.clone()}</dd>
                                                </dl>
                                            </div>
                                        }
                                        .into_any()
                                    }
                                    None => view! {
                                        <Alert kind=AlertKind::Error message="User not found".to_string() />
                                    }
                                    .into_any(),
                                }
                            }
                            Some(Err(err)) => {
                                view! { <Alert kind=AlertKind::Error message=err.user_message() /> }
                                    .into_any()
                            }
                            None => view! { <Spinner /> }.into_any(),
                        }}
                    </Suspense>

                    <form class="space-y-4 border-t border-gray-200 dark:border-gray-700 pt-4" on:submit=on_save>
                        <h2 class="text-sm font-semibold text-gray-900 dark:text-white">
                            "Edit account"
                        </h2>
                        <p class="text-xs text-gray-500 dark:text-gray-400">
                            "Only filled-in fields are changed."
                        </p>
                        <input
                            type="text"
                            placeholder="New username"
                            class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg block w-full p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            on:input=move |event| set_username.set(event_target_value(&event))
                        />
                        <input
                            type="email"
                            placeholder="New email"
                            class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg block w-full p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            on:input=move |event| set_email.set(event_target_value(&event))
                        />
                        <select
                            class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg block w-full p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            on:change=move |event| set_role.set(event_target_value(&event))
                        >
                            <option value="">"Keep role"</option>
                            <option value="user">"User"</option>
                            <option value="moderator">"Moderator"</option>
                            <option value="admin">"Admin"</option>
                        </select>
                        <select
                            class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg block w-full p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            on:change=move |event| set_verified.set(event_target_value(&event))
                        >
                            <option value="">"Keep verification status"</option>
                            <option value="yes">"Verified"</option>
                            <option value="no">"Not verified"</option>
                        </select>
                        <div class="flex items-center gap-4">
                            <Button button_type="submit" disabled=update_action.pending()>
                                "Save"
                            </Button>
                            <Show when=move || auth.session.get().map(|u| u.is_admin()).unwrap_or(false)>
                                <button
                                    type="button"
                                    class="text-sm text-red-600 hover:text-red-800 dark:text-red-400"
                                    on:click=on_delete
                                >
                                    "Delete user"
                                </button>
                            </Show>
                        </div>
                    </form>

                    {move || {
                        notice
                            .get()
                            .map(|message| {
                                view! { <Alert kind=AlertKind::Success message=message /> }
                            })
                    }}
                    {move || {
                        error
                            .get()
                            .map(|err| {
                                view! { <Alert kind=AlertKind::Error message=err.user_message() /> }
                            })
                    }}
                </div>
            </RequireStaff>
        </AppShell>
    }
}
