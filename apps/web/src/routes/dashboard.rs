//! Landing page. Greets a signed-in user and nudges unverified accounts
//! toward the verification flow.

use crate::components::{Alert, AlertKind, AppShell};
use crate::features::auth::state::use_auth;
use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <AppShell>
            <div class="max-w-2xl mx-auto space-y-6">
                {move || match auth.session.get() {
                    Some(user) => {
                        let unverified = !user.is_verified;
                        view! {
                            <div class="space-y-4">
                                <h1 class="text-2xl font-semibold text-gray-900 dark:text-white">
                                    {format!("Welcome back, {}", user.username)}
                                </h1>
                                {unverified.then(|| view! {
                                    <Alert
                                        kind=AlertKind::Info
                                        message="Your email is not verified yet. Check your inbox for the code.".to_string()
                                    />
                                    <A
                                        href="/verify-email"
                                        {..}
                                        class="inline-block text-blue-600 hover:text-blue-800 dark:text-blue-400 text-sm"
                                    >
                                        "Verify your email"
                                    </A>
                                })}
                            </div>
                        }
                        .into_any()
                    }
                    None => view! {
                        <div class="text-center space-y-4 py-12">
                            <h1 class="text-3xl font-semibold text-gray-900 dark:text-white">
                                "Snippets"
                            </h1>
                            <p class="text-gray-500 dark:text-gray-400">
                                "Sign in to manage your account, or create a new one."
                            </p>
                            <div class="flex items-center justify-center gap-4">
                                <A
                                    href="/login"
                                    {..}
                                    class="text-blue-600 hover:text-blue-800 dark:text-blue-400"
                                >
                                    "Sign In"
                                </A>
                                <A
                                    href="/register"
                                    {..}
                                    class="text-blue-600 hover:text-blue-800 dark:text-blue-400"
                                >
                                    "Sign Up"
                                </A>
                            </div>
                        </div>
                    }
                    .into_any(),
                }}
            </div>
        </AppShell>
    }
}
