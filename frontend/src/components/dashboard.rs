use crate::components::icons::*;
use crate::context::use_app;
use crate::controllers::ListState;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use dispatchboard_shared::display::format_date;
use dispatchboard_shared::summary::{AgentStats, DistributionStats};
use dispatchboard_shared::{Agent, AgentQuery, Distribution, DistributionQuery};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 概览区块中展示的条目数
const RECENT_LIMIT: usize = 5;

#[component]
fn StatCard(title: &'static str, value: Signal<String>, description: Signal<String>, children: Children) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-figure">{children()}</div>
            <div class="stat-title">{title}</div>
            <div class="stat-value">{move || value.get()}</div>
            <div class="stat-desc">{move || description.get()}</div>
        </div>
    }
}

#[component]
fn QuickAction(to: AppRoute, title: &'static str, hint: &'static str, children: Children) -> impl IntoView {
    view! {
        <Link to=to class="card bg-base-200 hover:bg-base-300 transition-colors">
            <div class="card-body items-center text-center p-4">
                {children()}
                <p class="font-medium">{title}</p>
                <p class="text-xs opacity-60">{hint}</p>
            </div>
        </Link>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = use_app();
    let agents = RwSignal::new(ListState::<Agent>::default());
    let distributions = RwSignal::new(ListState::<Distribution>::default());

    // 初始加载
    Effect::new(move |_| {
        let agents = ctx.agents(agents);
        let distributions = ctx.distributions(distributions);
        spawn_local(async move {
            let _ = futures::join!(
                agents.fetch(AgentQuery::default()),
                distributions.fetch(DistributionQuery::default()),
            );
        });
    });

    let agent_stats = Memo::new(move |_| agents.with(|s| AgentStats::from_agents(&s.items)));
    let distribution_stats =
        Memo::new(move |_| distributions.with(|s| DistributionStats::from_distributions(&s.items)));

    let recent_distributions = move || {
        distributions.with(|s| s.items.iter().take(RECENT_LIMIT).cloned().collect::<Vec<_>>())
    };
    let recent_agents = move || agents.with(|s| s.items.iter().take(RECENT_LIMIT).cloned().collect::<Vec<_>>());
    let errors = move || {
        [agents.with(|s| s.error.clone()), distributions.with(|s| s.error.clone())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
    };

    view! {
        <div class="space-y-6">
            <div>
                <h1 class="text-2xl font-bold">"Dashboard"</h1>
                <p class="text-base-content/70">"Overview of your agents and distributions"</p>
            </div>

            {move || {
                errors()
                    .into_iter()
                    .map(|message| view! {
                        <div role="alert" class="alert alert-error text-sm">
                            <AlertCircle attr:class="h-5 w-5" />
                            <span>{message}</span>
                        </div>
                    })
                    .collect_view()
            }}

            <div class="stats shadow w-full stats-vertical lg:stats-horizontal bg-base-100">
                <StatCard
                    title="Total Agents"
                    value=Signal::derive(move || agent_stats.get().total.to_string())
                    description=Signal::derive(move || format!("{} active", agent_stats.get().active))
                >
                    <Users attr:class="h-8 w-8 text-info" />
                </StatCard>
                <StatCard
                    title="Active Agents"
                    value=Signal::derive(move || agent_stats.get().active.to_string())
                    description=Signal::stored("Available for distribution".to_string())
                >
                    <CheckCircle attr:class="h-8 w-8 text-success" />
                </StatCard>
                <StatCard
                    title="Total Distributions"
                    value=Signal::derive(move || distribution_stats.get().total.to_string())
                    description=Signal::stored("Files processed".to_string())
                >
                    <Upload attr:class="h-8 w-8 text-secondary" />
                </StatCard>
                <StatCard
                    title="Records Distributed"
                    value=Signal::derive(move || distribution_stats.get().records.to_string())
                    description=Signal::stored("Across all agents".to_string())
                >
                    <FileText attr:class="h-8 w-8 text-warning" />
                </StatCard>
            </div>

            <div class="grid gap-6 md:grid-cols-2">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Recent Distributions"</h3>
                        <p class="text-sm opacity-70">"Latest file uploads and distributions"</p>
                        <Show
                            when=move || distributions.with(|s| !s.items.is_empty())
                            fallback=|| view! {
                                <div class="text-center py-6 opacity-60">
                                    <Upload attr:class="mx-auto h-8 w-8 mb-2" />
                                    <p>"No distributions yet"</p>
                                    <p class="text-xs">"Upload a file to get started"</p>
                                </div>
                            }
                        >
                            <div class="space-y-3">
                                <For
                                    each=recent_distributions
                                    key=|d| d.id.clone()
                                    children=|d| view! {
                                        <div class="flex items-center justify-between p-3 bg-base-200 rounded-box">
                                            <div class="min-w-0">
                                                <p class="text-sm font-medium truncate">{d.file_name.clone()}</p>
                                                <p class="text-xs opacity-60">{format!("Assigned to {}", d.agent_name)}</p>
                                            </div>
                                            <div class="text-right">
                                                <span class="badge badge-ghost">{format!("{} records", d.total_items)}</span>
                                                <p class="text-xs opacity-60 mt-1">{format_date(&d.upload_date)}</p>
                                            </div>
                                        </div>
                                    }
                                />
                            </div>
                        </Show>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Agents Overview"</h3>
                        <p class="text-sm opacity-70">"Your registered agents"</p>
                        <Show
                            when=move || agents.with(|s| !s.items.is_empty())
                            fallback=|| view! {
                                <div class="text-center py-6 opacity-60">
                                    <Users attr:class="mx-auto h-8 w-8 mb-2" />
                                    <p>"No agents yet"</p>
                                    <p class="text-xs">"Create agents to start distributing"</p>
                                </div>
                            }
                        >
                            <div class="space-y-3">
                                <For
                                    each=recent_agents
                                    key=|a| (a.id.clone(), a.updated_at)
                                    children=|a| view! {
                                        <div class="flex items-center justify-between p-3 bg-base-200 rounded-box">
                                            <div class="min-w-0">
                                                <p class="text-sm font-medium truncate">{a.name.clone()}</p>
                                                <p class="text-xs opacity-60">{a.email.clone()}</p>
                                            </div>
                                            <div class="text-right">
                                                {if a.is_active {
                                                    view! { <span class="badge badge-success">"Active"</span> }.into_any()
                                                } else {
                                                    view! { <span class="badge badge-ghost">"Inactive"</span> }.into_any()
                                                }}
                                                <p class="text-xs opacity-60 mt-1">{a.mobile.clone()}</p>
                                            </div>
                                        </div>
                                    }
                                />
                            </div>
                        </Show>
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Quick Actions"</h3>
                    <div class="grid gap-4 md:grid-cols-3">
                        <QuickAction to=AppRoute::Agents title="Manage Agents" hint="Add, edit, or remove agents">
                            <Users attr:class="h-8 w-8 text-info" />
                        </QuickAction>
                        <QuickAction to=AppRoute::Upload title="Upload File" hint="Distribute CSV/Excel data">
                            <Upload attr:class="h-8 w-8 text-success" />
                        </QuickAction>
                        <QuickAction to=AppRoute::Distributions title="View Reports" hint="Distribution analytics">
                            <FileText attr:class="h-8 w-8 text-secondary" />
                        </QuickAction>
                    </div>
                </div>
            </div>
        </div>
    }
}
