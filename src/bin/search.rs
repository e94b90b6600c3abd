use clap::Parser;
use colored::Colorize as _;
use job_scout::{
    init_logger, Config, ExperienceLevel, HttpFetcher, JobFilter, JobType, RonStore, Scraper,
    SearchRequest,
};

/// Search the job board and store what turns up.
#[derive(Parser)]
#[command(name = "search")]
struct Args {
    /// Search keywords.
    keywords: Vec<String>,

    #[arg(short, long)]
    location: Option<String>,

    /// A category tag to expand into extra keywords. Can be repeated.
    #[arg(short, long = "category")]
    categories: Vec<String>,

    #[arg(short = 'n', long, default_value = "20")]
    limit: usize,

    /// Only show jobs of this type, e.g. "full-time" or "contract".
    #[arg(long)]
    job_type: Option<JobType>,

    /// Only show jobs at this experience level, e.g. "junior" or "mid-level".
    #[arg(long)]
    level: Option<ExperienceLevel>,

    /// Only show jobs paying at least this many thousands.
    #[arg(long)]
    min_salary: Option<u64>,

    /// Generate mock jobs instead of scraping.
    #[arg(long)]
    mock: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger(log::LevelFilter::Info);
    let args = Args::parse();

    let mut config = Config::load()?;
    config.scraper.use_mock_data |= args.mock;
    let fetcher = HttpFetcher::new(&config.scraper)?;
    let mut store = RonStore::open(&config.jobs_path)?;

    let mut scraper = Scraper::new(config.board, config.scraper, fetcher, &mut store)?;
    let jobs = scraper.search(&SearchRequest {
        keywords: args.keywords,
        location: args.location,
        categories: args.categories,
        limit: args.limit,
    });
    drop(scraper);

    let filter = JobFilter {
        job_type: args.job_type,
        experience_level: args.level,
        min_salary_k: args.min_salary,
        ..Default::default()
    };
    for job in filter.apply(jobs) {
        println!(
            "{}{} {} {} {}",
            job.prefix(),
            job.to_string().bold(),
            format!("[{}]", job.company).green(),
            job.location,
            format!("({}, {})", job.salary_range, job.job_type).italic(),
        );
        if !job.skills.is_empty() {
            println!("    {}", job.skills.join(", ").dimmed());
        }
        if !job.link.is_empty() {
            println!("    {}", job.link.italic().black());
        }
    }

    store.save()?;
    Ok(())
}
