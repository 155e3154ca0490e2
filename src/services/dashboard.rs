// Dashboard aggregation
//
// Periods resolve to half-open UTC windows [start, end). Trends compare the
// window against the equal-length window immediately before it. Only the
// ownership filter is pushed into the store; counting and summation happen
// here over fetched documents.
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;
use crate::models::{Customer, Payment, Revenue, Sale, SaleStatus, User};
use crate::store::{DocumentStore, Filter, Repo};

/// Named reporting window. Unrecognized query values fall back to the
/// current month rather than erroring; dashboard widgets always render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    ThisWeek,
    CurrentMonth,
    LastMonth,
    ThisYear,
}

impl Period {
    pub fn parse(value: Option<&str>) -> Period {
        match value {
            Some("today") => Period::Today,
            Some("this_week") => Period::ThisWeek,
            Some("last_month") => Period::LastMonth,
            Some("this_year") => Period::ThisYear,
            _ => Period::CurrentMonth,
        }
    }

    /// UTC window for this period at `now`. Weeks start on Monday; the
    /// last-month window ends where the current month begins.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        match self {
            Period::Today => (start_of(today), now),
            Period::ThisWeek => {
                let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
                (start_of(monday), now)
            }
            Period::CurrentMonth => (start_of(month_start(today)), now),
            Period::LastMonth => {
                let this_month = month_start(today);
                let last_month = month_start(this_month.pred_opt().unwrap_or(this_month));
                (start_of(last_month), start_of(this_month))
            }
            Period::ThisYear => {
                let jan_first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (start_of(jan_first), now)
            }
        }
    }
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// The window of equal length immediately before `[start, end)`.
fn previous_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (start - (end - start), start)
}

fn in_window(t: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= t && t < end
}

/// Percentage change rounded to one decimal. A prior window with no activity
/// reports the configured fallback figure instead of dividing by zero.
fn trend(current: f64, previous: f64, fallback: f64) -> f64 {
    if previous == 0.0 {
        fallback
    } else {
        let pct = (current - previous) / previous * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub period: Period,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub stats: PeriodStats,
    pub trends: TrendFigures,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub total_customers: i64,
    pub total_sales: i64,
    pub completed_sales: i64,
    pub pending_sales: i64,
    pub total_revenue: f64,
    pub total_payments: f64,
}

#[derive(Debug, Serialize)]
pub struct TrendFigures {
    pub customers: f64,
    pub sales: f64,
    pub revenue: f64,
    pub payments: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub total_customers: i64,
    pub total_sales: i64,
    pub completed_sales: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_users: i64,
    pub total_customers: i64,
    pub total_sales: i64,
    pub total_revenue: f64,
    pub total_payments: f64,
}

pub struct DashboardService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> DashboardService<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Period snapshot for the whole business (`scope` = None) or one agent.
    pub async fn snapshot(
        &self,
        period: Period,
        scope: Option<Uuid>,
    ) -> Result<DashboardSnapshot, ApiError> {
        let now = Utc::now();
        let (start, end) = period.window(now);
        let (prev_start, prev_end) = previous_window(start, end);

        let customers = Repo::<Customer>::new(self.store)
            .list(&scoped(scope))
            .await?;
        let sales = Repo::<Sale>::new(self.store).list(&scoped(scope)).await?;

        let customers_now = customers
            .iter()
            .filter(|c| in_window(c.created_at, start, end))
            .count() as i64;
        let customers_prev = customers
            .iter()
            .filter(|c| in_window(c.created_at, prev_start, prev_end))
            .count() as i64;

        let sales_now: Vec<&Sale> = sales
            .iter()
            .filter(|s| in_window(s.date, start, end))
            .collect();
        let sales_prev: Vec<&Sale> = sales
            .iter()
            .filter(|s| in_window(s.date, prev_start, prev_end))
            .collect();
        let completed_sales = sales_now
            .iter()
            .filter(|s| s.status == SaleStatus::Completed)
            .count() as i64;
        let pending_sales = sales_now
            .iter()
            .filter(|s| s.status == SaleStatus::Pending)
            .count() as i64;

        // Revenue: the global view sums the revenue ledger; the agent view
        // sums that agent's completed sales, since revenue records carry no
        // owning agent.
        let (revenue_now, revenue_prev) = match scope {
            None => {
                let revenues = Repo::<Revenue>::new(self.store).list(&Filter::new()).await?;
                (
                    revenues
                        .iter()
                        .filter(|r| in_window(r.date, start, end))
                        .map(|r| r.amount)
                        .sum(),
                    revenues
                        .iter()
                        .filter(|r| in_window(r.date, prev_start, prev_end))
                        .map(|r| r.amount)
                        .sum(),
                )
            }
            Some(_) => (
                sales_now
                    .iter()
                    .filter(|s| s.status == SaleStatus::Completed)
                    .map(|s| s.amount)
                    .sum(),
                sales_prev
                    .iter()
                    .filter(|s| s.status == SaleStatus::Completed)
                    .map(|s| s.amount)
                    .sum(),
            ),
        };

        // Payments carry no owning agent either; the agent view joins
        // through that agent's sale ids.
        let payments = Repo::<Payment>::new(self.store).list(&Filter::new()).await?;
        let relevant: Vec<&Payment> = match scope {
            None => payments.iter().collect(),
            Some(_) => {
                let sale_ids: HashSet<Uuid> = sales.iter().map(|s| s.id).collect();
                payments
                    .iter()
                    .filter(|p| sale_ids.contains(&p.sale_id))
                    .collect()
            }
        };
        let payments_now: f64 = relevant
            .iter()
            .filter(|p| in_window(p.date, start, end))
            .map(|p| p.amount)
            .sum();
        let payments_prev: f64 = relevant
            .iter()
            .filter(|p| in_window(p.date, prev_start, prev_end))
            .map(|p| p.amount)
            .sum();

        let fallbacks = &config::config().dashboard;
        Ok(DashboardSnapshot {
            period,
            start_date: start,
            end_date: end,
            stats: PeriodStats {
                total_customers: customers_now,
                total_sales: sales_now.len() as i64,
                completed_sales,
                pending_sales,
                total_revenue: revenue_now,
                total_payments: payments_now,
            },
            trends: TrendFigures {
                customers: trend(
                    customers_now as f64,
                    customers_prev as f64,
                    fallbacks.customers_trend_fallback,
                ),
                sales: trend(
                    sales_now.len() as f64,
                    sales_prev.len() as f64,
                    fallbacks.sales_trend_fallback,
                ),
                revenue: trend(revenue_now, revenue_prev, fallbacks.revenue_trend_fallback),
                payments: trend(
                    payments_now,
                    payments_prev,
                    fallbacks.payments_trend_fallback,
                ),
            },
        })
    }

    /// Lifetime figures for one agent, used by the admin agent view.
    pub async fn agent_stats(&self, agent_id: Uuid) -> Result<AgentStats, ApiError> {
        let total_customers = Repo::<Customer>::new(self.store)
            .count(&Filter::new().eq("agentID", agent_id))
            .await?;
        let sales = Repo::<Sale>::new(self.store)
            .list(&Filter::new().eq("agentID", agent_id))
            .await?;
        let completed: Vec<&Sale> = sales
            .iter()
            .filter(|s| s.status == SaleStatus::Completed)
            .collect();

        Ok(AgentStats {
            total_customers,
            total_sales: sales.len() as i64,
            completed_sales: completed.len() as i64,
            total_revenue: completed.iter().map(|s| s.amount).sum(),
        })
    }

    /// All-time headline figures for any authenticated caller.
    pub async fn summary(&self) -> Result<SummaryStats, ApiError> {
        let total_users = Repo::<User>::new(self.store).count(&Filter::new()).await?;
        let total_customers = Repo::<Customer>::new(self.store)
            .count(&Filter::new())
            .await?;
        let total_sales = Repo::<Sale>::new(self.store).count(&Filter::new()).await?;
        let revenues = Repo::<Revenue>::new(self.store).list(&Filter::new()).await?;
        let payments = Repo::<Payment>::new(self.store).list(&Filter::new()).await?;

        Ok(SummaryStats {
            total_users,
            total_customers,
            total_sales,
            total_revenue: revenues.iter().map(|r| r.amount).sum(),
            total_payments: payments.iter().map(|p| p.amount).sum(),
        })
    }
}

fn scoped(scope: Option<Uuid>) -> Filter {
    match scope {
        Some(agent_id) => Filter::new().eq("agentID", agent_id),
        None => Filter::new(),
    }
}
