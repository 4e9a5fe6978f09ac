use crate::analyzer::radar::aggregate;
use crate::analyzer::trend::{available_companies, build_trend, coverage, select_subset};
use crate::analyzer::TrendTable;
use crate::chart::ChartRenderer;
use crate::config::ExportConfig;
use crate::console::Console;
use crate::export::{default_file_name, resolve_export_path, write_workbook};
use crate::menu::{
    IndicatorChoice, MenuState, PostTrendChoice, RadarPeriod, RadarRepeat, parse_subset,
};
use crate::model::{Category, Company, Indicator, SessionError, WorkingSet};
use crate::normalizer::normalize;
use crate::provider::FinancialProvider;
use crate::resolver::{Resolution, pick_candidate, resolve, split_tokens};
use crate::utils::open_with_system_viewer;

use tracing::{info, warn};

const RULE_WIDTH: usize = 60;

/// Drives the menu state machine over one console.
pub struct Session<C, P, R> {
    console: C,
    provider: P,
    renderer: R,
    export: ExportConfig,
    universe: Vec<Company>,
    companies: WorkingSet,
}

impl<C: Console, P: FinancialProvider, R: ChartRenderer> Session<C, P, R> {
    pub fn new(console: C, provider: P, renderer: R, export: ExportConfig) -> Self {
        Self {
            console,
            provider,
            renderer,
            export,
            universe: Vec::new(),
            companies: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn console(&self) -> &C {
        &self.console
    }

    #[cfg(test)]
    pub fn companies(&self) -> &WorkingSet {
        &self.companies
    }

    /// Runs until the user exits. A provider outage while loading the
    /// universe ends the run after telling the user.
    pub fn run(&mut self) -> Result<(), SessionError> {
        self.header("上市公司财务对比系统");

        self.universe = match self.provider.universe() {
            Ok(universe) => universe,
            Err(e) => {
                warn!("Universe unavailable: {}", e);
                self.console.say("❌ 网络错误");
                return Ok(());
            }
        };

        let mut state = MenuState::CollectCompanies;
        loop {
            state = match state {
                MenuState::CollectCompanies => self.collect_companies()?,
                MenuState::RadarPeriodChoice => self.radar_period_choice()?,
                MenuState::RadarRepeatChoice => self.radar_repeat_choice()?,
                MenuState::IndicatorMenu => self.indicator_menu()?,
                MenuState::CompanySubsetChoice(indicator) => self.company_subset_choice(indicator)?,
                MenuState::PostTrendAction(table) => self.post_trend_action(&table)?,
                MenuState::Exit => break,
            };
        }

        info!("Session finished");
        Ok(())
    }

    fn header(&mut self, title: &str) {
        let rule = "-".repeat(RULE_WIDTH);
        self.console.say(&format!("\n{}", rule));
        self.console.say(&format!(" {}", title));
        self.console.say(&rule);
    }

    fn section(&mut self, title: &str) {
        self.console.say(&format!("\n🔹 {}", title));
        self.console.say(&"-".repeat(RULE_WIDTH));
    }

    fn collect_companies(&mut self) -> Result<MenuState, SessionError> {
        let answer = self.console.ask("\n👉 请输入对比公司 (逗号分隔): ")?;
        let tokens = split_tokens(&answer);
        if tokens.is_empty() {
            return Ok(MenuState::CollectCompanies);
        }

        self.section("获取数据");
        for token in tokens {
            let Some(company) = self.resolve_token(&token)? else {
                self.console.say(&format!("   ❌ 未找到: {}", token));
                continue;
            };
            if self.companies.iter().any(|c| c.name == company.name) {
                continue;
            }
            self.load_company(company);
        }

        if self.companies.is_empty() {
            warn!("No requested company yielded data");
            self.console.say("\n❌ 程序异常退出。");
            return Ok(MenuState::Exit);
        }
        Ok(MenuState::RadarPeriodChoice)
    }

    fn resolve_token(&mut self, token: &str) -> Result<Option<Company>, SessionError> {
        match resolve(token, &self.universe) {
            Resolution::Found(company) => Ok(Some(company)),
            Resolution::NotFound => Ok(None),
            Resolution::Ambiguous(candidates) => {
                self.console
                    .say(&format!("\n   ⚠️  输入 '{}' 找到多个匹配，请确认：", token));
                for (i, c) in candidates.iter().enumerate() {
                    self.console
                        .say(&format!("      {}. {:<10} ({})", i + 1, c.name, c.code));
                }
                let answer = self.console.ask(&format!(
                    "   👉 请输入编号 (1-{})，回车默认选1: ",
                    candidates.len()
                ))?;
                let index = pick_candidate(&answer, candidates.len());
                Ok(candidates.into_iter().nth(index))
            }
        }
    }

    fn load_company(&mut self, company: Company) {
        let record = match self.provider.financial_abstract(&company.code) {
            Ok(raw) => normalize(&raw, &company.name, &company.code),
            Err(e) => {
                warn!("Fetching {} ({}) failed: {}", company.name, company.code, e);
                None
            }
        };

        match record {
            Some(record) => {
                info!("Loaded {} ({})", record.name, record.code);
                self.companies.push(record);
                self.console.say(&format!("   ⏳ 获取 {} ... ✅", company.name));
            }
            None => {
                self.console
                    .say(&format!("   ⏳ 获取 {} ... ❌ 无数据", company.name));
            }
        }
    }

    fn radar_period_choice(&mut self) -> Result<MenuState, SessionError> {
        let years = self
            .companies
            .first()
            .map(|c| c.years())
            .unwrap_or_default();

        self.section("步骤 2: 雷达图对比");
        self.console.say("👇 请选择数据统计口径:");
        self.console.say(&format!(
            "   1. 最新一年 ({})",
            years.first().map_or("N/A", String::as_str)
        ));
        self.console.say("   2. 三年平均");
        self.console.say("   3. 五年平均");

        let answer = self.console.ask("\n👉 请输入编号 (按回车键默认1): ")?;
        let Some(selection) = RadarPeriod::parse(&answer).selection(&years) else {
            self.console.say("❌ 年份数据异常，跳过绘图");
            return Ok(MenuState::IndicatorMenu);
        };

        self.console
            .say(&format!("⏳ 正在生成 {} 雷达图...", selection.label()));
        let chart = aggregate(&self.companies, selection);
        match self.renderer.render_radar(&chart) {
            Ok(path) => self
                .console
                .say(&format!("🖼  雷达图已保存: {}", path.display())),
            Err(e) => {
                warn!("Radar rendering failed: {}", e);
                self.console.say(&format!("❌ 雷达图绘制失败: {}", e));
            }
        }
        Ok(MenuState::RadarRepeatChoice)
    }

    fn radar_repeat_choice(&mut self) -> Result<MenuState, SessionError> {
        self.console.say(&format!("\n{}", "-".repeat(40)));
        self.console.say("操作选择:");
        self.console.say("   1. ✅ 继续下一步 (趋势分析)");
        self.console.say("   2. 🔄 重新选择年份绘制雷达图");

        let answer = self.console.ask("\n👉 请输入 (1/2, 默认1): ")?;
        Ok(match RadarRepeat::parse(&answer) {
            RadarRepeat::Redo => MenuState::RadarPeriodChoice,
            RadarRepeat::Continue => MenuState::IndicatorMenu,
        })
    }

    fn indicator_menu(&mut self) -> Result<MenuState, SessionError> {
        self.console.say(&format!("\n{}", "=".repeat(40)));
        self.console.say(" 📊 指标选择菜单");

        let total = self.companies.len();
        for category in Category::ALL {
            self.console.say(&format!(" {}", category.label()));
            for (i, indicator) in Indicator::ALL.iter().enumerate() {
                if indicator.category() != category {
                    continue;
                }
                let count = coverage(&self.companies, *indicator);
                let status = if count > 0 {
                    format!("[{}/{}]", count, total)
                } else {
                    "[无数据]".to_string()
                };
                self.console
                    .say(&format!("   {}. {:<10} {}", i + 1, indicator.name(), status));
            }
        }

        let answer = self.console.ask("\n👉 请输入指标编号 (输入 q 退出): ")?;
        Ok(match IndicatorChoice::parse(&answer) {
            IndicatorChoice::Quit => MenuState::Exit,
            IndicatorChoice::Pick(indicator) => MenuState::CompanySubsetChoice(indicator),
            IndicatorChoice::Invalid => {
                self.console.say("❌ 输入无效");
                MenuState::IndicatorMenu
            }
        })
    }

    fn company_subset_choice(&mut self, indicator: Indicator) -> Result<MenuState, SessionError> {
        let available = available_companies(&self.companies, indicator);
        if available.is_empty() {
            self.console.say("❌ 无公司有此数据");
            return Ok(MenuState::IndicatorMenu);
        }

        let selected = if available.len() == 1 {
            available
        } else {
            self.console
                .say(&format!("\n👇 请选择要对比 '{}' 的公司:", indicator.name()));
            for (i, company) in available.iter().enumerate() {
                self.console.say(&format!("   {}. {}", i + 1, company.name));
            }
            self.console.say("   a. 所有公司");
            self.console.say("   d. 默认 (前3家)");

            let answer = self
                .console
                .ask("\n👉 请输入 (编号用逗号隔开/a/d，默认d): ")?;
            let selected = select_subset(&available, &parse_subset(&answer));
            let names: Vec<&str> = selected.iter().map(|c| c.name.as_str()).collect();
            self.console.say(&format!("✅ 已选择: {}", names.join(", ")));
            selected
        };

        let Some(table) = build_trend(&selected, indicator) else {
            self.console
                .say(&format!("❌ 选中公司没有 {} 数据", indicator.name()));
            return Ok(MenuState::IndicatorMenu);
        };

        match self.renderer.render_trend(&table) {
            Ok(path) => self
                .console
                .say(&format!("🖼  趋势图已保存: {}", path.display())),
            Err(e) => {
                warn!("Trend rendering failed: {}", e);
                self.console.say(&format!("❌ 趋势图绘制失败: {}", e));
            }
        }

        self.console
            .say(&format!("\n--- {} 数据明细 ---", indicator.name()));
        for line in table.render_lines() {
            self.console.say(&line);
        }

        Ok(MenuState::PostTrendAction(table))
    }

    fn post_trend_action(&mut self, table: &TrendTable) -> Result<MenuState, SessionError> {
        self.console.say("\n👇 操作: 1.导出Excel  2.继续分析  3.退出");
        let answer = self.console.ask("👉 请输入: ")?;
        let choice = PostTrendChoice::parse(&answer);
        if choice == PostTrendChoice::Export {
            self.export_table(table)?;
        }
        Ok(choice.next_state())
    }

    fn export_table(&mut self, table: &TrendTable) -> Result<(), SessionError> {
        let default_name = default_file_name(table.indicator);
        self.console.say(&format!(
            "\n📂 请输入保存路径或文件名 (直接回车默认: {})",
            default_name
        ));
        let answer = self.console.ask("👉 路径: ")?;
        let path = resolve_export_path(&self.export.directory, &answer, table.indicator);

        self.console
            .say(&format!("⏳ 正在写入: {} ...", path.display()));
        match write_workbook(table, &path) {
            Ok(written) => {
                self.console
                    .say(&format!("✅ 导出成功！文件位置: {}", written.display()));
                if self.export.open_after_export {
                    open_with_system_viewer(&written);
                }
            }
            Err(e) => {
                warn!("Export to {} failed: {}", path.display(), e);
                self.console.say(&format!("❌ 导出失败: {}", e));
            }
        }
        Ok(())
    }
}
