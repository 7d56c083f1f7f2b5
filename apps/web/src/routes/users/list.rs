//! User listing for staff, with filters and pagination. The backend enforces
//! authorization; the guard here only shapes navigation.

use crate::components::{Alert, AlertKind, AppShell, Button, Spinner};
use crate::features::auth::guards::RequireStaff;
use crate::features::users::{client, types::ListQuery};
use crate::routes::paths;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn UsersListPage() -> impl IntoView {
    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (role, set_role) = signal(String::new());
    let query = RwSignal::new(ListQuery {
        page: 1,
        ..ListQuery::default()
    });

    let users = LocalResource::new(move || {
        let query = query.get();
        async move { client::list_users(&query).await }
    });

    let on_filter = move |event: SubmitEvent| {
        event.prevent_default();
        query.set(ListQuery {
            username: username.get_untracked(),
            email: email.get_untracked(),
            role: role.get_untracked(),
            page: 1,
        });
    };

    let go_to_page = move |page: i64| {
        query.update(|q| q.page = page.max(1));
    };

    view! {
        <AppShell>
            <RequireStaff>
                <div class="space-y-6">
                    <div class="space-y-1">
                        <h1 class="text-2xl font-semibold text-gray-900 dark:text-white">
                            "Users"
                        </h1>
                        <p class="text-sm text-gray-500 dark:text-gray-400">
                            "View and manage all registered users."
                        </p>
                    </div>

                    <form class="flex flex-wrap items-end gap-3" on:submit=on_filter>
                        <input
                            type="text"
                            placeholder="Username"
                            class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            on:input=move |event| set_username.set(event_target_value(&event))
                        />
                        <input
                            type="text"
                            placeholder="Email"
                            class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            on:input=move |event| set_email.set(event_target_value(&event))
                        />
                        <select
                            class="bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            on:change=move |event| set_role.set(event_target_value(&event))
                        >
                            <option value="">"Any role"</option>
                            <option value="user">"User"</option>
                            <option value="moderator">"Moderator"</option>
                            <option value="admin">"Admin"</option>
                        </select>
                        <Button button_type="submit">"Filter"</Button>
                    </form>

                    <div class="overflow-hidden bg-white dark:bg-gray-800 shadow-sm border border-gray-200 dark:border-gray-700 rounded-lg">
                        <table class="min-w-full divide-y divide-gray-200 dark:divide-gray-700">
                            <thead class="bg-gray-50 dark:bg-gray-900/50">
                                <tr>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 dark:text-gray-400 uppercase tracking-wider">
                                        "Username"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 dark:text-gray-400 uppercase tracking-wider">
                                        "Email"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 dark:text-gray-400 uppercase tracking-wider">
                                        "Role"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 dark:text-gray-400 uppercase tracking-wider">
                                        "Verified"
                                    </th>
                                    <th scope="col" class="px-6 py-3 text-right text-xs font-medium text-gray-500 dark:text-gray-400 uppercase tracking-wider">
                                        "Actions"
                                    </th>
                                </tr>
                            </thead>
                            <tbody class="divide-y divide-gray-200 dark:divide-gray-700">
                                <Suspense fallback=move || view! {
                                    <tr>
                                        <td colspan="5" class="px-6 py-12 text-center">
                                            <Spinner />
                                        </td>
                                    </tr>
                                }>
                                    {move || match users.get() {
                                        Some(Ok(success)) => {
                                            let page = success.data;
                                            match page {
                                                Some(page) if page.users.is_empty() => {
                                                    view! {
                                                        <tr>
                                                            <td colspan="5" class="px-6 py-12 text-center text-sm text-gray-500 dark:text-gray-400">
                                                                "No users found."
                                                            </td>
                                                        </tr>
                                                    }.into_any()
                                                }
                                                Some(page) => {
                                                    view! {
                                                        <For
                                                            each=move || page.users.clone()
                                                            key=|user| user.id.clone()
                                                            children=|user| {
                                                                view! {
                                                                    <tr class="hover:bg-gray-50 dark:hover:bg-gray-700/50 transition-colors">
                                                                        <td class="px-6 py-4 whitespace-nowrap text-sm font-medium text-gray-900 dark:text-white">
                                                                            <A
                                                                                href={paths::user_detail(&user.id)}
                                                                                {..}
                                                                                class="text-blue-600 hover:text-blue-800 dark:text-blue-400 dark:hover:text-blue-300"
                                                                            >
                                                                                {user.username.clone()}
                                                                            </A>
                                                                        </td>
                                                                        <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500 dark:text-gray-400">
                                                                            {user.email.clone()}
                                                                        </td>
                                                                        <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500 dark:text-gray-400">
                                                                            {user.role.clone()}
                                                                        </td>
                                                                        <td class="px-6 py-4 whitespace-nowrap text-sm text-gray-500 dark:text-gray-400">
                                                                            {if user.is_verified { "Yes" } else { "No" }}
                                                                        </td>
                                                                        <td class="px-6 py-4 whitespace-nowrap text-right text-sm font-medium">
                                                                            <A
                                                                                href={paths::user_detail(&user.id)}
                                                                                {..}
                                                                                class="text-blue-600 hover:text-blue-800 dark:text-blue-400 dark:hover:text-blue-300"
                                                                            >
                                                                                "View"
                                                                            </A>
                                                                        </td>
                                                                    </tr>
                                                                }
                                                            }
                                                        />
                                                    }.into_any()
                                                }
                                                None => {
                                                    view! {
                                                        <tr>
                                                            <td colspan="5" class="px-6 py-12 text-center text-sm text-gray-500 dark:text-gray-400">
                                                                "No users found."
                                                            </td>
                                                        </tr>
                                                    }.into_any()
                                                }
                                            }
                                        }
                                        Some(Err(err)) => {
                                            view! {
                                                <tr>
                                                    <td colspan="5" class="px-6 py-4">
                                                        <Alert kind=AlertKind::Error message=err.user_message() />
                                                    </td>
                                                </tr>
                                            }.into_any()
                                        }
                                        None => view! {
                                            <tr>
                                                <td colspan="5" class="px-6 py-12 text-center">
                                                    <Spinner />
                                                </td>
                                            </tr>
                                        }.into_any(),
                                    }}
                                </Suspense>
                            </tbody>
                        </table>
                    </div>

                    {move || {
                        users.get().and_then(|result| result.ok()).and_then(|success| success.data).map(|page| {
                            let current = page.page;
                            let pages = page.pages;
                            view! {
                                <div class="flex items-center justify-between text-sm text-gray-500 dark:text-gray-400">
                                    <span>{format!("Page {current} of {pages} ({} users)", page.total)}</span>
                                    <div class="flex gap-2">
                                        <button
                                            type="button"
                                            class="px-3 py-1 rounded border border-gray-300 dark:border-gray-600 disabled:opacity-50"
                                            disabled=current <= 1
                                            on:click=move |_| go_to_page(current - 1)
                                        >
                                            "Previous"
                                        </button>
                                        <button
                                            type="button"
                                            class="px-3 py-1 rounded border border-gray-300 dark:border-gray-600 disabled:opacity-50"
                                            disabled=current >= pages
                                            on:click=move |_| go_to_page(current + 1)
                                        >
                                            "Next"
                                        </button>
                                    </div>
                                </div>
                            }
                        })
                    }}
                </div>
            </RequireStaff>
        </AppShell>
    }
}
